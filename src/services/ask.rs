use crate::error::ApiError;
use crate::models::{AskRequest, AskResponse, Role};
use crate::services::chat_history::{ChatHistoryService, HISTORY_LIMIT};
use crate::services::classifier::{CLUB_INTEREST, INTENT, NEED_HISTORY, SAFETY};
use crate::services::club_editor::ClubEditorService;
use crate::services::context::{
    render_history, ContextService, ANSWER_RULES, WEBSITE_MANAGER_CONTEXT, WEBSITE_STUDENT_CONTEXT,
};
use crate::services::llm::{LlmClient, Provider};
use crate::services::recommendation::RecommendationService;
use crate::services::retrieval::{HandbookMode, RetrievalService};
use log::{debug, warn};

static EMPTY_QUESTION_ANSWER: &str =
    "Please type a question about the club or the website and I'll do my best to help.";

static UNSAFE_QUESTION_ANSWER: &str = "I'm sorry, but I cannot answer this question as it appears to be inappropriate or unrelated to club or website topics.";

/// The `/ask` pipeline: safety filter, manager edit flow, history loading,
/// recommendation branch, intent classification, context assembly, final
/// answer, history insert.
pub struct AskPipeline {
    llm: LlmClient,
    context: ContextService,
    history: ChatHistoryService,
    recommender: RecommendationService,
    editor: ClubEditorService,
    retrieval: RetrievalService,
}

impl AskPipeline {
    pub fn new(
        llm: LlmClient,
        context: ContextService,
        history: ChatHistoryService,
        recommender: RecommendationService,
        editor: ClubEditorService,
        retrieval: RetrievalService,
    ) -> Self {
        Self {
            llm,
            context,
            history,
            recommender,
            editor,
            retrieval,
        }
    }

    pub async fn answer(&self, request: &AskRequest) -> Result<AskResponse, ApiError> {
        let question = request.user_question.trim();
        if question.is_empty() {
            return Ok(AskResponse::text(EMPTY_QUESTION_ANSWER));
        }

        if SAFETY.classify(&self.llm, question).await != "Yes" {
            debug!("Filtered unsafe question for session {}", request.session_id);
            return Ok(AskResponse::text(UNSAFE_QUESTION_ANSWER));
        }

        let role = Role::from_logged_role(&request.logged_role);

        if role == Role::Manager {
            let prefix = self.history_context(request).await;
            if let Some(answer) = self.editor.handle(request, &prefix).await? {
                self.record(request, question, &answer).await;
                return Ok(AskResponse::text(answer));
            }
        }

        let mut history_context = String::new();
        if NEED_HISTORY.classify(&self.llm, question).await == "Yes" {
            history_context = self.history_context(request).await;
        }

        if CLUB_INTEREST.classify(&self.llm, question).await == "Yes" {
            let recommendation = self.recommender.recommend(question).await;
            self.record(request, question, &recommendation.answer).await;
            return Ok(AskResponse::with_clubs(
                recommendation.answer,
                recommendation.clubs,
            ));
        }

        if mentions_handbook(question) {
            let mode = handbook_mode(role, &request.user_id);
            let answer = self.retrieval.answer_from_handbook(mode, question).await;
            self.record(request, question, &answer).await;
            return Ok(AskResponse::text(answer));
        }

        let intent = INTENT.classify(&self.llm, question).await;
        let context = match intent {
            "Website" => website_context(role).to_string(),
            "Both" => {
                let club = self
                    .context
                    .club_context(&request.club_id, &request.user_id)
                    .await;
                format!("{}{}", club, website_context(role))
            }
            _ => {
                self.context
                    .club_context(&request.club_id, &request.user_id)
                    .await
            }
        };

        let mut full_context = String::new();
        if !history_context.is_empty() {
            full_context.push_str("Previous conversation:\n");
            full_context.push_str(&history_context);
            full_context.push('\n');
        }
        full_context.push_str(&context);
        full_context.push_str(ANSWER_RULES);

        let answer = self
            .llm
            .complete(Provider::Groq, &full_context, question)
            .await?;
        self.record(request, question, &answer).await;

        Ok(AskResponse::text(answer))
    }

    async fn history_context(&self, request: &AskRequest) -> String {
        match self
            .history
            .last_chats(&request.session_id, &request.user_id, HISTORY_LIMIT)
            .await
        {
            Ok(records) => render_history(&records),
            Err(err) => {
                warn!(
                    "Failed to load chat history for session {}: {}",
                    request.session_id, err
                );
                String::new()
            }
        }
    }

    async fn record(&self, request: &AskRequest, question: &str, answer: &str) {
        self.history
            .record(&request.session_id, &request.user_id, question, answer)
            .await;
    }
}

fn website_context(role: Role) -> &'static str {
    match role {
        Role::Manager => WEBSITE_MANAGER_CONTEXT,
        Role::Student => WEBSITE_STUDENT_CONTEXT,
    }
}

fn mentions_handbook(question: &str) -> bool {
    question.to_lowercase().contains("handbook")
}

/// Managers read the manager handbook, logged-in students the student
/// handbook, guests the general one.
fn handbook_mode(role: Role, user_id: &str) -> HandbookMode {
    match role {
        Role::Manager => HandbookMode::Manager,
        Role::Student if user_id == "none" => HandbookMode::General,
        Role::Student => HandbookMode::Student,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handbook_routing_is_keyword_based() {
        assert!(mentions_handbook("What does the handbook say about dues?"));
        assert!(mentions_handbook("HANDBOOK rules?"));
        assert!(!mentions_handbook("When are the meetings?"));
    }

    #[test]
    fn website_context_follows_role() {
        assert_eq!(website_context(Role::Student), WEBSITE_STUDENT_CONTEXT);
        assert_eq!(website_context(Role::Manager), WEBSITE_MANAGER_CONTEXT);
    }

    #[test]
    fn handbook_mode_follows_role_and_login_state() {
        assert_eq!(
            handbook_mode(Role::Manager, "user-1"),
            HandbookMode::Manager
        );
        assert_eq!(handbook_mode(Role::Student, "user-1"), HandbookMode::Student);
        assert_eq!(handbook_mode(Role::Student, "none"), HandbookMode::General);
    }
}
