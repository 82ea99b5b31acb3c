pub mod ask;
pub mod chat_history;
pub mod classifier;
pub mod club_editor;
pub mod context;
pub mod llm;
pub mod pinecone;
pub mod recommendation;
pub mod retrieval;
pub mod supabase;

// Re-export public types
pub use ask::AskPipeline;
pub use chat_history::ChatHistoryService;
pub use classifier::Classifier;
pub use club_editor::ClubEditorService;
pub use context::ContextService;
pub use llm::{LlmClient, Provider};
pub use pinecone::PineconeClient;
pub use recommendation::RecommendationService;
pub use retrieval::{HandbookMode, RetrievalService};
pub use supabase::SupabaseClient;
