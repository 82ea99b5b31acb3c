use crate::error::ApiError;
use crate::services::llm::{LlmClient, Provider};
use crate::services::pinecone::PineconeClient;
use log::warn;
use reqwest::Client;

static EMBEDDING_MODEL: &str = "models/embedding-001";
static GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Chunks injected into the answer prompt per query.
const TOP_K: usize = 3;

static INDEX_UNAVAILABLE_ANSWER: &str =
    "Sorry, I couldn't access the handbook database. Please try again later.";

static NO_ANSWER_FALLBACK: &str = "Sorry, I couldn't answer your question based on the handbook. Please try asking in a different way.";

/// Which handbook index a question is answered from. One namespace per
/// handbook document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandbookMode {
    General,
    Student,
    Manager,
}

impl HandbookMode {
    pub fn namespace(&self) -> &'static str {
        match self {
            HandbookMode::General => "handbook-general",
            HandbookMode::Student => "handbook-student",
            HandbookMode::Manager => "handbook-manager",
        }
    }
}

/// Embedding + similarity retrieval over the pre-indexed handbook PDFs,
/// delegated entirely to hosted services.
#[derive(Debug, Clone)]
pub struct RetrievalService {
    http: Client,
    gemini_api_key: String,
    pinecone: PineconeClient,
    llm: LlmClient,
}

impl RetrievalService {
    pub fn new(gemini_api_key: &str, pinecone: PineconeClient, llm: LlmClient) -> Self {
        Self {
            http: Client::new(),
            gemini_api_key: gemini_api_key.to_string(),
            pinecone,
            llm,
        }
    }

    /// Answer a question from a handbook. Retrieval failures degrade to fixed
    /// apology answers instead of surfacing errors.
    pub async fn answer_from_handbook(&self, mode: HandbookMode, user_question: &str) -> String {
        let embedding = match self.embed(user_question).await {
            Ok(embedding) => embedding,
            Err(err) => {
                warn!("Handbook embedding failed: {}", err);
                return INDEX_UNAVAILABLE_ANSWER.to_string();
            }
        };

        let response = match self.pinecone.query(mode.namespace(), embedding, TOP_K).await {
            Ok(response) => response,
            Err(err) => {
                warn!("Handbook index query failed: {}", err);
                return INDEX_UNAVAILABLE_ANSWER.to_string();
            }
        };

        let chunks: Vec<String> = response
            .matches
            .iter()
            .filter_map(|m| {
                m.metadata
                    .as_ref()
                    .and_then(|meta| meta.get("text"))
                    .and_then(|text| text.as_str())
                    .map(|text| text.to_string())
            })
            .collect();

        if chunks.is_empty() {
            return NO_ANSWER_FALLBACK.to_string();
        }

        let prompt = handbook_prompt(&chunks);
        match self
            .llm
            .complete(Provider::Gemini, &prompt, user_question)
            .await
        {
            Ok(answer) => answer,
            Err(err) => {
                warn!("Handbook answer generation failed: {}", err);
                NO_ANSWER_FALLBACK.to_string()
            }
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        #[derive(serde::Serialize)]
        struct EmbedRequest<'a> {
            model: &'a str,
            content: Content<'a>,
        }

        #[derive(serde::Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }

        #[derive(serde::Serialize)]
        struct Part<'a> {
            text: &'a str,
        }

        #[derive(serde::Deserialize)]
        struct EmbedResponse {
            embedding: Embedding,
        }

        #[derive(serde::Deserialize)]
        struct Embedding {
            values: Vec<f32>,
        }

        let url = format!(
            "{}/{}:embedContent?key={}",
            GEMINI_API_URL, EMBEDDING_MODEL, self.gemini_api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&EmbedRequest {
                model: EMBEDDING_MODEL,
                content: Content {
                    parts: vec![Part { text }],
                },
            })
            .send()
            .await
            .map_err(|e| ApiError::RetrievalError(e.to_string()))?
            .error_for_status()
            .map_err(|e| ApiError::RetrievalError(format!("Embedding request failed: {}", e)))?
            .json::<EmbedResponse>()
            .await
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;

        Ok(response.embedding.values)
    }
}

/// The answer prompt, with retrieved chunks in place of the database-derived
/// context used elsewhere.
fn handbook_prompt(chunks: &[String]) -> String {
    format!(
        r#"You are a helpful assistant for a club management website.
Use the following pieces of context to answer the question at the end.
If you don't know the answer, just say you don't know. Don't try to make up an answer.
Act as a chatbot, so if you don't know say you don't have the data to answer the question.
Keep the answer concise and to the point.

{}"#,
        chunks.join("\n\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_mode_maps_to_its_own_namespace() {
        assert_eq!(HandbookMode::General.namespace(), "handbook-general");
        assert_eq!(HandbookMode::Student.namespace(), "handbook-student");
        assert_eq!(HandbookMode::Manager.namespace(), "handbook-manager");
    }

    #[test]
    fn handbook_prompt_includes_all_chunks() {
        let chunks = vec!["First chunk.".to_string(), "Second chunk.".to_string()];
        let prompt = handbook_prompt(&chunks);

        assert!(prompt.contains("First chunk."));
        assert!(prompt.contains("Second chunk."));
        assert!(prompt.contains("Keep the answer concise"));
    }
}
