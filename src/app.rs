use crate::{
    config::Config,
    error::Result,
    routes::app_routes,
    services::{
        AskPipeline, ChatHistoryService, ClubEditorService, ContextService, LlmClient,
        PineconeClient, RecommendationService, RetrievalService, SupabaseClient,
    },
};
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;
use std::net::TcpListener;

pub struct Application {
    port: u16,
    host: String,
    config: Config,
}

impl Application {
    /// Create a new application instance
    pub fn new(config: &Config) -> Self {
        Self {
            port: config.port,
            host: config.host.clone(),
            config: config.clone(),
        }
    }

    /// Build and run the server
    pub async fn run(&self) -> Result<()> {
        // Always bind to 0.0.0.0 for Docker/Render compatibility
        let bind_address = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&bind_address)?;
        info!("Starting server at http://{}:{}", self.host, self.port);

        self.run_with_listener(listener).await
    }

    /// Run the server with a specific TCP listener
    /// This is useful for testing where we want to use a random port
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        // Initialize service clients
        let supabase = SupabaseClient::new(&self.config.supabase_url, &self.config.supabase_key);
        let llm = LlmClient::new(&self.config.groq_api_key, &self.config.gemini_api_key);
        let pinecone = PineconeClient::new(
            &self.config.pinecone_api_key,
            &self.config.pinecone_index_host,
        )?;

        let pipeline = web::Data::new(AskPipeline::new(
            llm.clone(),
            ContextService::new(supabase.clone()),
            ChatHistoryService::new(supabase.clone()),
            RecommendationService::new(supabase.clone(), llm.clone()),
            ClubEditorService::new(supabase, llm.clone()),
            RetrievalService::new(&self.config.gemini_api_key, pinecone, llm),
        ));

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .app_data(pipeline.clone())
                .configure(app_routes)
        })
        .listen(listener)?
        .run()
        .await?;

        Ok(())
    }
}
