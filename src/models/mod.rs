use serde::{Deserialize, Serialize};

pub use chat::{ChatRecord, EditSession};
pub use club::{Club, ClubFacts, Event, Faq};

mod chat;
mod club;

/// Request body for the `/ask` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub club_id: String,
    pub user_question: String,
    pub user_id: String,
    pub logged_role: String,
    pub session_id: String,
}

/// Response envelope for the `/ask` endpoint. `clubs` is only present on
/// recommendation replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clubs: Option<Vec<Club>>,
}

impl AskResponse {
    pub fn text(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            clubs: None,
        }
    }

    pub fn with_clubs(answer: impl Into<String>, clubs: Vec<Club>) -> Self {
        Self {
            answer: answer.into(),
            clubs: Some(clubs),
        }
    }
}

/// Role the website reports for the asking user. Anything that is not a
/// manager is treated as a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Manager,
}

impl Role {
    pub fn from_logged_role(logged_role: &str) -> Self {
        if logged_role.trim().eq_ignore_ascii_case("manager") {
            Role::Manager
        } else {
            Role::Student
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_request_deserializes_wire_format() {
        let body = r#"{
            "club_id": "4798d2b6-073b-4428-96a2-1a0e6184f7ed",
            "user_question": "When are the meetings?",
            "user_id": "none",
            "logged_role": "student",
            "session_id": "abc-123"
        }"#;

        let request: AskRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.user_id, "none");
        assert_eq!(request.session_id, "abc-123");
    }

    #[test]
    fn plain_answer_omits_clubs_field() {
        let json = serde_json::to_value(AskResponse::text("hi")).unwrap();
        assert_eq!(json["answer"], "hi");
        assert!(json.get("clubs").is_none());
    }

    #[test]
    fn recommendation_answer_carries_clubs() {
        let json = serde_json::to_value(AskResponse::with_clubs("try these", vec![])).unwrap();
        assert!(json["clubs"].is_array());
    }

    #[test]
    fn unknown_roles_fall_back_to_student() {
        assert_eq!(Role::from_logged_role("manager"), Role::Manager);
        assert_eq!(Role::from_logged_role("Manager"), Role::Manager);
        assert_eq!(Role::from_logged_role("student"), Role::Student);
        assert_eq!(Role::from_logged_role("moderator"), Role::Student);
        assert_eq!(Role::from_logged_role(""), Role::Student);
    }
}
