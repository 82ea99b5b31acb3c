use crate::error::ApiError;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde_json::{Map, Value};

static GROQ_MODEL: &str = "llama3-70b-8192";
static GEMINI_MODEL: &str = "gemini-2.5-flash-preview-04-17";

static GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
static GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Which chat-completion provider serves a call. Classification calls default
/// to Gemini; final answers go through Groq.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Groq,
    Gemini,
}

/// Client for the interchangeable chat-completion providers. Both providers
/// take a system/background context plus the user question and return free
/// text.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: Client,
    groq_api_key: String,
    gemini_api_key: String,
}

impl LlmClient {
    pub fn new(groq_api_key: &str, gemini_api_key: &str) -> Self {
        Self {
            http: Client::new(),
            groq_api_key: groq_api_key.to_string(),
            gemini_api_key: gemini_api_key.to_string(),
        }
    }

    pub async fn complete(
        &self,
        provider: Provider,
        context_text: &str,
        user_question: &str,
    ) -> Result<String, ApiError> {
        match provider {
            Provider::Groq => self.complete_groq(context_text, user_question).await,
            Provider::Gemini => self.complete_gemini(context_text, user_question).await,
        }
    }

    async fn complete_groq(
        &self,
        context_text: &str,
        user_question: &str,
    ) -> Result<String, ApiError> {
        #[derive(serde::Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(serde::Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<Message<'a>>,
            temperature: f32,
        }

        #[derive(serde::Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        #[derive(serde::Deserialize)]
        struct Choice {
            message: ChoiceMessage,
        }

        #[derive(serde::Deserialize)]
        struct ChoiceMessage {
            content: String,
        }

        let response = self
            .http
            .post(GROQ_API_URL)
            .bearer_auth(&self.groq_api_key)
            .json(&ChatRequest {
                model: GROQ_MODEL,
                messages: vec![
                    Message {
                        role: "system",
                        content: context_text,
                    },
                    Message {
                        role: "user",
                        content: user_question,
                    },
                ],
                temperature: 0.5,
            })
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::LlmError(format!("Groq request failed: {}", e)))?
            .json::<ChatResponse>()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ApiError::LlmError("Groq returned no choices".to_string()))
    }

    async fn complete_gemini(
        &self,
        context_text: &str,
        user_question: &str,
    ) -> Result<String, ApiError> {
        #[derive(serde::Serialize)]
        struct GenerateRequest<'a> {
            contents: Vec<Content<'a>>,
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
        struct GenerateResponse {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }

        #[derive(serde::Deserialize)]
        struct Candidate {
            content: CandidateContent,
        }

        #[derive(serde::Deserialize)]
        struct CandidateContent {
            #[serde(default)]
            parts: Vec<CandidatePart>,
        }

        #[derive(serde::Deserialize)]
        struct CandidatePart {
            #[serde(default)]
            text: String,
        }

        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_URL, GEMINI_MODEL, self.gemini_api_key
        );
        let full_prompt = format!("{}\n\nUser question: {}", context_text, user_question);

        let response = self
            .http
            .post(&url)
            .json(&GenerateRequest {
                contents: vec![Content {
                    parts: vec![Part { text: &full_prompt }],
                }],
            })
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::LlmError(format!("Gemini request failed: {}", e)))?
            .json::<GenerateResponse>()
            .await?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| ApiError::LlmError("Gemini returned no candidates".to_string()))
    }
}

lazy_static! {
    static ref JSON_OBJECT: Regex = Regex::new(r"(?s)\{.*?\}").unwrap();
}

/// Parse a JSON object out of an LLM reply that may be wrapped in markdown
/// code fences or surrounding prose. Falls back to a brace scan before giving
/// up.
pub fn parse_json_reply(raw: &str) -> Result<Map<String, Value>, ApiError> {
    let cleaned = strip_code_fences(raw.trim());

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&cleaned) {
        return Ok(map);
    }

    for candidate in JSON_OBJECT.find_iter(&cleaned) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(candidate.as_str()) {
            return Ok(map);
        }
    }

    Err(ApiError::SerializationError(
        "Failed to parse LLM reply as JSON".to_string(),
    ))
}

fn strip_code_fences(reply: &str) -> String {
    if !reply.starts_with("```") {
        return reply.to_string();
    }

    let body = match reply.find('\n') {
        // Drop the opening fence line, which may carry a language tag.
        Some(newline) => &reply[newline + 1..],
        None => &reply[3..],
    };

    match body.rfind("```") {
        Some(end) => body[..end].trim().to_string(),
        None => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json_object_parses() {
        let map = parse_json_reply(r#"{"name": "Chess Club"}"#).unwrap();
        assert_eq!(map["name"], "Chess Club");
    }

    #[test]
    fn fenced_json_with_language_tag_parses() {
        let raw = "```json\n{\"location\": \"Room 12\"}\n```";
        let map = parse_json_reply(raw).unwrap();
        assert_eq!(map["location"], "Room 12");
    }

    #[test]
    fn fenced_json_without_language_tag_parses() {
        let raw = "```\n{\"category\": \"Sports\"}\n```";
        let map = parse_json_reply(raw).unwrap();
        assert_eq!(map["category"], "Sports");
    }

    #[test]
    fn json_buried_in_prose_is_recovered() {
        let raw = "Here are the updates you asked for: {\"name\": \"Hiking Club\"} let me know!";
        let map = parse_json_reply(raw).unwrap();
        assert_eq!(map["name"], "Hiking Club");
    }

    #[test]
    fn non_json_reply_is_an_error() {
        assert!(parse_json_reply("I could not find any fields to update.").is_err());
    }

    #[test]
    fn unterminated_fence_still_parses() {
        let raw = "```json\n{\"name\": \"Art Club\"}";
        let map = parse_json_reply(raw).unwrap();
        assert_eq!(map["name"], "Art Club");
    }
}
