use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A row in the `chat_history` table, keyed by (session_id, user_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRecord {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub session_id: String,
    pub user_id: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ChatRecord {
    pub fn new(session_id: &str, user_id: &str, question: &str, answer: &str) -> Self {
        Self {
            id: Some(Uuid::new_v4()),
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            created_at: Some(Utc::now()),
        }
    }
}

/// Pending manager edit flow state, persisted in the `edit_sessions` table
/// keyed by (session_id, user_id). `updates` accumulates field changes until
/// the manager says "done".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditSession {
    pub session_id: String,
    pub user_id: String,
    pub action: String,
    pub club_id: String,
    #[serde(default)]
    pub updates: Map<String, Value>,
}

impl EditSession {
    pub fn editing(session_id: &str, user_id: &str, club_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            action: "editing".to_string(),
            club_id: club_id.to_string(),
            updates: Map::new(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.action == "editing"
    }
}
