use crate::error::ApiError;
use reqwest::{header::HeaderMap, Client};
use serde::{Deserialize, Serialize};

/// Client for the hosted vector index. The handbook index is built offline;
/// this service only queries it.
#[derive(Debug, Clone)]
pub struct PineconeClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
pub struct QueryRequest {
    pub namespace: String,
    pub vector: Vec<f32>,
    pub top_k: usize,
    pub include_values: bool,
    pub include_metadata: bool,
}

#[derive(Debug, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub matches: Vec<QueryMatch>,
}

impl PineconeClient {
    pub fn new(api_key: &str, index_host: &str) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Api-Key",
            api_key
                .parse()
                .map_err(|_| ApiError::RetrievalError("Invalid Pinecone API key".to_string()))?,
        );
        headers.insert(
            "Accept",
            "application/json"
                .parse()
                .map_err(|_| ApiError::RetrievalError("Invalid header value".to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::RetrievalError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: index_host.trim_end_matches('/').to_string(),
        })
    }

    pub async fn query(
        &self,
        namespace: &str,
        vector: Vec<f32>,
        top_k: usize,
    ) -> Result<QueryResponse, ApiError> {
        let request = QueryRequest {
            namespace: namespace.to_string(),
            vector,
            top_k,
            include_values: false,
            include_metadata: true,
        };

        let response = self
            .client
            .post(format!("{}/query", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::RetrievalError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable error body".to_string());
            return Err(ApiError::RetrievalError(format!(
                "Pinecone query failed: {}",
                error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::SerializationError(e.to_string()))
    }
}
