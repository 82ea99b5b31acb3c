use crate::error::ApiError;
use crate::models::{AskRequest, EditSession};
use crate::services::classifier::EDIT_INTENT;
use crate::services::llm::{parse_json_reply, LlmClient, Provider};
use crate::services::supabase::SupabaseClient;
use log::{info, warn};
use serde_json::{Map, Value};

/// Club columns a manager may change through the chat flow.
pub static ALLOWED_FIELDS: &[&str] = &[
    "name",
    "description",
    "category",
    "location",
    "meeting_time",
    "website_url",
    "leader_name",
    "leader_contact",
];

static GUIDANCE_ANSWER: &str = "Sure! What would you like to change? You can say things like \"Change the name to X\" or \"Update meeting_time to Tuesdays at 5pm.\"";

static PARSE_FAILURE_ANSWER: &str = "Sorry, I couldn't parse your update. Please mention something like \"set the description to ...\" or \"update the leader_contact.\"";

static NO_FIELDS_ANSWER: &str = "I didn't catch any valid fields to update. Please mention at least one of: name, description, category, location, meeting_time, website_url, leader_name, leader_contact, and its new value.";

static SAVE_FAILURE_ANSWER: &str = "Oops, couldn't save your updates. Please try again.";

/// Multi-turn editing flow for club managers. State lives in the backend so
/// the flow survives across stateless requests.
#[derive(Debug, Clone)]
pub struct ClubEditorService {
    supabase: SupabaseClient,
    llm: LlmClient,
}

impl ClubEditorService {
    pub fn new(supabase: SupabaseClient, llm: LlmClient) -> Self {
        Self { supabase, llm }
    }

    /// Run one step of the edit flow. `None` means the message is not part of
    /// an edit interaction and should fall through to normal classification.
    pub async fn handle(
        &self,
        request: &AskRequest,
        history_prefix: &str,
    ) -> Result<Option<String>, ApiError> {
        let state = match self
            .supabase
            .load_edit_session(&request.session_id, &request.user_id)
            .await
        {
            Ok(state) => state,
            Err(err) => {
                warn!("Failed to load edit session: {}", err);
                None
            }
        };

        let editing = state.as_ref().map(|s| s.is_editing()).unwrap_or(false);

        if !editing {
            let intent = EDIT_INTENT
                .classify_with_prefix(&self.llm, &request.user_question, history_prefix)
                .await;
            if intent != "Edit" {
                return Ok(None);
            }

            let session =
                EditSession::editing(&request.session_id, &request.user_id, &request.club_id);
            self.supabase.save_edit_session(&session).await?;
            return Ok(Some(GUIDANCE_ANSWER.to_string()));
        }

        let state = match state {
            Some(state) => state,
            None => return Ok(None),
        };

        if wants_to_finish(&request.user_question) {
            return Ok(Some(self.apply_updates(&state).await));
        }

        let prompt = extraction_prompt(&state.club_id, &state.updates, &request.user_question);
        let raw = match self.llm.complete(Provider::Gemini, &prompt, "").await {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Edit extraction failed: {}", err);
                return Ok(Some(PARSE_FAILURE_ANSWER.to_string()));
            }
        };

        let new_updates = match parse_json_reply(&raw) {
            Ok(map) => filter_allowed(map),
            Err(_) => return Ok(Some(PARSE_FAILURE_ANSWER.to_string())),
        };

        if new_updates.is_empty() {
            return Ok(Some(NO_FIELDS_ANSWER.to_string()));
        }

        let mut session = state;
        session.updates = merge_updates(session.updates.clone(), new_updates);
        self.supabase.save_edit_session(&session).await?;

        if session.updates.len() == ALLOWED_FIELDS.len() {
            // Every editable column has a pending value; apply without
            // waiting for "done".
            return Ok(Some(self.apply_updates(&session).await));
        }

        let fields: Vec<&str> = session.updates.keys().map(String::as_str).collect();
        Ok(Some(format!(
            "Got it. I'll update: {}. Anything else? Say 'done' when you're finished.",
            fields.join(", ")
        )))
    }

    async fn apply_updates(&self, session: &EditSession) -> String {
        if session.updates.is_empty() {
            self.clear(session).await;
            return NO_FIELDS_ANSWER.to_string();
        }

        match self
            .supabase
            .update_club(&session.club_id, &session.updates)
            .await
        {
            Ok(true) => {
                let fields: Vec<&str> = session.updates.keys().map(String::as_str).collect();
                info!(
                    "Applied club edits for club {}: {}",
                    session.club_id,
                    fields.join(", ")
                );
                self.clear(session).await;
                format!(
                    "All set! Updated fields: {}. Please refresh your page to see the changes.",
                    fields.join(", ")
                )
            }
            Ok(false) => {
                self.clear(session).await;
                SAVE_FAILURE_ANSWER.to_string()
            }
            Err(err) => {
                warn!("Failed to apply club edits: {}", err);
                self.clear(session).await;
                SAVE_FAILURE_ANSWER.to_string()
            }
        }
    }

    async fn clear(&self, session: &EditSession) {
        if let Err(err) = self
            .supabase
            .clear_edit_session(&session.session_id, &session.user_id)
            .await
        {
            warn!("Failed to clear edit session: {}", err);
        }
    }
}

fn extraction_prompt(club_id: &str, existing: &Map<String, Value>, message: &str) -> String {
    format!(
        r#"We are updating club ID {}. Current pending updates:
{}

Manager says:
"""
{}
"""

Extract any of these fields (if mentioned):
name, description, category, location, meeting_time, website_url, leader_name, leader_contact.
Return a pure JSON object of only the newly specified field:value pairs."#,
        club_id,
        serde_json::to_string(existing).unwrap_or_else(|_| "{}".to_string()),
        message
    )
}

fn wants_to_finish(message: &str) -> bool {
    message.to_lowercase().contains("done")
}

/// Keep only editable columns from the extracted object.
fn filter_allowed(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter(|(key, _)| ALLOWED_FIELDS.contains(&key.as_str()))
        .collect()
}

/// Merge newly extracted updates over pending ones; new values win.
fn merge_updates(existing: Map<String, Value>, new: Map<String, Value>) -> Map<String, Value> {
    let mut merged = existing;
    for (key, value) in new {
        merged.insert(key, value);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    #[test]
    fn done_detection_is_case_insensitive() {
        assert!(wants_to_finish("done"));
        assert!(wants_to_finish("I'm DONE now"));
        assert!(!wants_to_finish("update the name"));
    }

    #[test]
    fn unknown_fields_are_dropped() {
        let extracted = map(&[("name", "Chess Club"), ("banner_color", "blue")]);
        let filtered = filter_allowed(extracted);

        assert_eq!(filtered.len(), 1);
        assert!(filtered.contains_key("name"));
    }

    #[test]
    fn new_values_win_on_merge() {
        let existing = map(&[("name", "Old Name"), ("location", "Room 1")]);
        let new = map(&[("name", "New Name")]);
        let merged = merge_updates(existing, new);

        assert_eq!(merged["name"], "New Name");
        assert_eq!(merged["location"], "Room 1");
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn extraction_prompt_quotes_the_message() {
        let prompt = extraction_prompt("club-1", &map(&[("name", "X")]), "set location to Hall B");

        assert!(prompt.contains("club ID club-1"));
        assert!(prompt.contains("set location to Hall B"));
        assert!(prompt.contains("\"name\":\"X\""));
    }
}
