use crate::error::ApiError;
use crate::models::{ChatRecord, Club, EditSession, Event, Faq};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Thin REST shim over Supabase (PostgREST conventions). Each method maps to
/// one table operation; no connection pooling or schema logic lives here.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch one club row by id. Returns `None` for an unknown id so callers
    /// can substitute placeholder facts instead of failing the request.
    pub async fn get_club_by_id(&self, club_id: &str) -> Result<Option<Club>, ApiError> {
        let url = format!(
            "{}/rest/v1/clubs?id=eq.{}&select=name,description,category,location,meeting_time,website_url,leader_name,leader_contact",
            self.base_url, club_id
        );
        let mut clubs: Vec<Club> = self.get_rows(&url).await?;
        Ok(clubs.pop())
    }

    pub async fn fetch_faqs_by_club(&self, club_id: &str) -> Result<Vec<Faq>, ApiError> {
        let url = format!(
            "{}/rest/v1/club_faqs?club_id=eq.{}&select=question,answer",
            self.base_url, club_id
        );
        self.get_rows(&url).await
    }

    pub async fn fetch_events_by_club(&self, club_id: &str) -> Result<Vec<Event>, ApiError> {
        let url = format!(
            "{}/rest/v1/events?club_id=eq.{}&select=title,description,location,time_range,start_date,end_date,status",
            self.base_url, club_id
        );
        self.get_rows(&url).await
    }

    /// Resolve a user id to a display name. Guests (`user_id == "none"`) and
    /// unknown ids resolve to "Guest".
    pub async fn fetch_username_by_id(&self, user_id: &str) -> Result<String, ApiError> {
        if user_id == "none" {
            return Ok("Guest".to_string());
        }

        #[derive(Deserialize)]
        struct ProfileRow {
            username: Option<String>,
        }

        let url = format!(
            "{}/rest/v1/profiles?id=eq.{}&select=username",
            self.base_url, user_id
        );
        let mut rows: Vec<ProfileRow> = self.get_rows(&url).await?;
        Ok(rows
            .pop()
            .and_then(|row| row.username)
            .unwrap_or_else(|| "Guest".to_string()))
    }

    pub async fn fetch_all_clubs(&self) -> Result<Vec<Club>, ApiError> {
        let url = format!(
            "{}/rest/v1/clubs?select=id,name,description,category,location,meeting_time,website_url,leader_name,leader_contact",
            self.base_url
        );
        self.get_rows(&url).await
    }

    /// Apply accumulated manager edits to a club row. Returns whether the
    /// PATCH matched a row.
    pub async fn update_club(
        &self,
        club_id: &str,
        updates: &Map<String, Value>,
    ) -> Result<bool, ApiError> {
        let url = format!("{}/rest/v1/clubs?id=eq.{}", self.base_url, club_id);
        let response = self
            .client
            .patch(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Prefer", "return=representation")
            .json(updates)
            .send()
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let rows: Vec<Value> = response
                    .json()
                    .await
                    .map_err(|e| ApiError::SerializationError(e.to_string()))?;
                Ok(!rows.is_empty())
            }
            status => Err(ApiError::DatabaseError(format!(
                "Failed to update club: {}",
                status
            ))),
        }
    }

    pub async fn insert_chat(&self, record: &ChatRecord) -> Result<(), ApiError> {
        self.insert("chat_history", record).await
    }

    /// Fetch the newest `limit` chat rows for a session, newest first. The
    /// chat history service reverses the page into chronological order.
    pub async fn fetch_last_chats(
        &self,
        session_id: &str,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatRecord>, ApiError> {
        let url = format!(
            "{}/rest/v1/chat_history?session_id=eq.{}&user_id=eq.{}&order=created_at.desc&limit={}",
            self.base_url, session_id, user_id, limit
        );
        self.get_rows(&url).await
    }

    pub async fn load_edit_session(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<Option<EditSession>, ApiError> {
        let url = format!(
            "{}/rest/v1/edit_sessions?session_id=eq.{}&user_id=eq.{}",
            self.base_url, session_id, user_id
        );
        let mut rows: Vec<EditSession> = self.get_rows(&url).await?;
        Ok(rows.pop())
    }

    /// Upsert the pending edit state for a session.
    pub async fn save_edit_session(&self, session: &EditSession) -> Result<(), ApiError> {
        let url = format!(
            "{}/rest/v1/edit_sessions?on_conflict=session_id,user_id",
            self.base_url
        );
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(session)
            .send()
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        match response.status() {
            StatusCode::CREATED | StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            status => Err(ApiError::DatabaseError(format!(
                "Failed to save edit session: {}",
                status
            ))),
        }
    }

    pub async fn clear_edit_session(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<(), ApiError> {
        let url = format!(
            "{}/rest/v1/edit_sessions?session_id=eq.{}&user_id=eq.{}",
            self.base_url, session_id, user_id
        );
        let response = self
            .client
            .delete(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            status => Err(ApiError::DatabaseError(format!(
                "Failed to clear edit session: {}",
                status
            ))),
        }
    }

    async fn get_rows<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, ApiError> {
        let response = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        match response.status() {
            StatusCode::OK => response
                .json()
                .await
                .map_err(|e| ApiError::SerializationError(e.to_string())),
            status => Err(ApiError::DatabaseError(format!(
                "Unexpected status code: {}",
                status
            ))),
        }
    }

    async fn insert<T: serde::Serialize>(&self, table: &str, data: &T) -> Result<(), ApiError> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Prefer", "return=minimal")
            .json(data)
            .send()
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        match response.status() {
            StatusCode::CREATED => Ok(()),
            status => Err(ApiError::DatabaseError(format!(
                "Failed to insert data: {}",
                status
            ))),
        }
    }
}
