use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub supabase_url: String,
    pub supabase_key: String,
    pub groq_api_key: String,
    pub gemini_api_key: String,
    pub pinecone_api_key: String,
    pub pinecone_index_host: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            supabase_url: env::var("SUPABASE_URL").context("SUPABASE_URL must be set")?,
            supabase_key: env::var("SUPABASE_KEY").context("SUPABASE_KEY must be set")?,
            groq_api_key: env::var("GROQ_API_KEY").context("GROQ_API_KEY must be set")?,
            gemini_api_key: env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?,
            pinecone_api_key: env::var("PINECONE_API_KEY")
                .context("PINECONE_API_KEY must be set")?,
            pinecone_index_host: env::var("PINECONE_INDEX_HOST")
                .context("PINECONE_INDEX_HOST must be set")?,
        })
    }
}
