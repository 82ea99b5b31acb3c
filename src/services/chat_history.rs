use crate::error::ApiError;
use crate::models::ChatRecord;
use crate::services::supabase::SupabaseClient;
use log::warn;

/// Default number of past exchanges pulled in as follow-up context.
pub const HISTORY_LIMIT: usize = 3;

#[derive(Debug, Clone)]
pub struct ChatHistoryService {
    supabase: SupabaseClient,
}

impl ChatHistoryService {
    pub fn new(supabase: SupabaseClient) -> Self {
        Self { supabase }
    }

    /// Store one Q/A exchange. Best effort: a failed insert is logged and
    /// swallowed so it never fails the user's request.
    pub async fn record(&self, session_id: &str, user_id: &str, question: &str, answer: &str) {
        let record = ChatRecord::new(session_id, user_id, question, answer);
        if let Err(err) = self.supabase.insert_chat(&record).await {
            warn!(
                "Failed to record chat history for session {}: {}",
                session_id, err
            );
        }
    }

    /// The last `limit` exchanges for a session, oldest first.
    pub async fn last_chats(
        &self,
        session_id: &str,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatRecord>, ApiError> {
        let rows = self
            .supabase
            .fetch_last_chats(session_id, user_id, limit)
            .await?;
        Ok(into_chronological(rows, limit))
    }
}

/// The backend returns rows newest first; flip them into chronological order
/// and enforce the bound locally as well.
fn into_chronological(mut rows: Vec<ChatRecord>, limit: usize) -> Vec<ChatRecord> {
    rows.truncate(limit);
    rows.reverse();
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(question: &str) -> ChatRecord {
        ChatRecord::new("s1", "u1", question, "answer")
    }

    #[test]
    fn newest_first_page_becomes_chronological() {
        let rows = vec![record("third"), record("second"), record("first")];
        let chronological = into_chronological(rows, 3);

        let questions: Vec<&str> = chronological
            .iter()
            .map(|r| r.question.as_str())
            .collect();
        assert_eq!(questions, vec!["first", "second", "third"]);
    }

    #[test]
    fn result_is_bounded_by_limit() {
        let rows = vec![
            record("fourth"),
            record("third"),
            record("second"),
            record("first"),
        ];
        let chronological = into_chronological(rows, 2);

        // The two newest survive, oldest of those first.
        let questions: Vec<&str> = chronological
            .iter()
            .map(|r| r.question.as_str())
            .collect();
        assert_eq!(questions, vec!["third", "fourth"]);
    }

    #[test]
    fn empty_history_stays_empty() {
        assert!(into_chronological(Vec::new(), HISTORY_LIMIT).is_empty());
    }
}
