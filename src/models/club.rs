use serde::{Deserialize, Serialize};

/// A row from the `clubs` table. Columns can be null in the database, so
/// every field stays optional until the context layer resolves placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Club {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub meeting_time: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub leader_name: Option<String>,
    #[serde(default)]
    pub leader_contact: Option<String>,
}

/// Club facts with placeholders already applied, ready for prompt text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClubFacts {
    pub name: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub website_url: String,
    pub leader_name: String,
    pub leader_contact: String,
}

impl Default for ClubFacts {
    fn default() -> Self {
        Self {
            name: "Unknown Club".to_string(),
            description: "No description available.".to_string(),
            category: "Unknown category.".to_string(),
            location: "Unknown location.".to_string(),
            website_url: "No website available.".to_string(),
            leader_name: "Unknown".to_string(),
            leader_contact: "Unknown".to_string(),
        }
    }
}

impl From<Club> for ClubFacts {
    fn from(club: Club) -> Self {
        let defaults = ClubFacts::default();
        Self {
            name: club.name.unwrap_or(defaults.name),
            description: club.description.unwrap_or(defaults.description),
            category: club.category.unwrap_or(defaults.category),
            location: club.location.unwrap_or(defaults.location),
            website_url: club.website_url.unwrap_or(defaults.website_url),
            leader_name: club.leader_name.unwrap_or(defaults.leader_name),
            leader_contact: club.leader_contact.unwrap_or(defaults.leader_contact),
        }
    }
}

/// A row from the `club_faqs` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// A row from the `events` table, restricted to the columns the context
/// builder renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub time_range: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_club_columns_resolve_to_placeholders() {
        let club: Club = serde_json::from_str(r#"{"name": "Chess Club"}"#).unwrap();
        let facts = ClubFacts::from(club);

        assert_eq!(facts.name, "Chess Club");
        assert_eq!(facts.description, "No description available.");
        assert_eq!(facts.leader_contact, "Unknown");
    }

    #[test]
    fn absent_club_uses_full_placeholder_set() {
        let facts = ClubFacts::default();
        assert_eq!(facts.name, "Unknown Club");
        assert_eq!(facts.website_url, "No website available.");
    }
}
