use crate::{
    error::ApiError,
    models::AskRequest,
    services::AskPipeline,
};
use actix_web::{
    web::{self, Json},
    HttpResponse,
};

pub fn ask_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ask").route(web::post().to(ask_question)));
}

/// Answer a club/website question. Every input yields a well-formed
/// `{answer, clubs?}` envelope; only a failure to produce any answer at all
/// becomes a 500.
pub async fn ask_question(
    request: Json<AskRequest>,
    pipeline: web::Data<AskPipeline>,
) -> Result<HttpResponse, ApiError> {
    let response = pipeline.answer(&request).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        AskPipeline, ChatHistoryService, ClubEditorService, ContextService, LlmClient,
        PineconeClient, RecommendationService, RetrievalService, SupabaseClient,
    };
    use actix_web::{test, App};

    fn offline_pipeline() -> AskPipeline {
        // Dummy endpoints: the paths under test return before any network
        // call is made.
        let supabase = SupabaseClient::new("http://localhost:1", "test-key");
        let llm = LlmClient::new("test-groq-key", "test-gemini-key");
        let pinecone = PineconeClient::new("test-pinecone-key", "http://localhost:1").unwrap();

        AskPipeline::new(
            llm.clone(),
            ContextService::new(supabase.clone()),
            ChatHistoryService::new(supabase.clone()),
            RecommendationService::new(supabase.clone(), llm.clone()),
            ClubEditorService::new(supabase, llm.clone()),
            RetrievalService::new("test-gemini-key", pinecone, llm),
        )
    }

    #[actix_web::test]
    async fn empty_question_gets_a_well_formed_envelope() {
        let pipeline = web::Data::new(offline_pipeline());
        let app =
            test::init_service(App::new().app_data(pipeline).configure(ask_config)).await;

        let request = test::TestRequest::post()
            .uri("/ask")
            .set_json(serde_json::json!({
                "club_id": "club-1",
                "user_question": "   ",
                "user_id": "none",
                "logged_role": "student",
                "session_id": "s-1"
            }))
            .to_request();

        let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;
        assert!(body["answer"].is_string());
        assert!(body.get("clubs").is_none());
    }
}
