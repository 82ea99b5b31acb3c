use crate::models::Club;
use crate::services::llm::{LlmClient, Provider};
use crate::services::supabase::SupabaseClient;
use log::warn;

static INTEREST_PROMPT: &str = r#"You are an assistant that extracts interests and hobbies from a user's question about club recommendations.
Extract ALL interests and hobbies as a comma-separated list. If no interests are found, respond with STRICTLY "none".

Examples:

Question: "I like playing sports and listening to music, what clubs do you recommend?"
Response: sports, music

Question: "I'm interested in photography, what clubs are available?"
Response: photography

Question: "What clubs do you recommend?"
Response: none

Extract interests from this question:"#;

static CLARIFY_ANSWER: &str =
    "Could you tell me about your hobbies or interests so I can recommend clubs for you?";

/// Outcome of the recommendation flow. `clubs` is empty when the user still
/// needs to clarify or nothing matched.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub answer: String,
    pub clubs: Vec<Club>,
}

/// Interest-based club recommendations: LLM extracts interests, the club list
/// is rendered into context, and the LLM picks matching club names.
#[derive(Debug, Clone)]
pub struct RecommendationService {
    supabase: SupabaseClient,
    llm: LlmClient,
}

impl RecommendationService {
    pub fn new(supabase: SupabaseClient, llm: LlmClient) -> Self {
        Self { supabase, llm }
    }

    pub async fn recommend(&self, user_question: &str) -> Recommendation {
        let interests = self.extract_interests(user_question).await;
        if interests.is_empty() {
            return Recommendation {
                answer: CLARIFY_ANSWER.to_string(),
                clubs: Vec::new(),
            };
        }

        let clubs = match self.supabase.fetch_all_clubs().await {
            Ok(clubs) => clubs,
            Err(err) => {
                warn!("Failed to fetch clubs for recommendation: {}", err);
                Vec::new()
            }
        };

        let matched_names = self.match_clubs(&interests, &clubs).await;
        let matched = select_matched(&clubs, &matched_names);

        if matched.is_empty() {
            Recommendation {
                answer: format!(
                    "Sorry, I couldn't find any clubs matching your interests {}. Would you like to see all available clubs?",
                    interests.join(", ")
                ),
                clubs: Vec::new(),
            }
        } else {
            Recommendation {
                answer: format!(
                    "Based on your interests {}, I recommend these clubs: {}.",
                    interests.join(", "),
                    matched_names.join(", ")
                ),
                clubs: matched,
            }
        }
    }

    async fn extract_interests(&self, user_question: &str) -> Vec<String> {
        match self
            .llm
            .complete(Provider::Gemini, INTEREST_PROMPT, user_question)
            .await
        {
            Ok(reply) => split_interests(&reply),
            Err(err) => {
                warn!("Interest extraction failed: {}", err);
                Vec::new()
            }
        }
    }

    async fn match_clubs(&self, interests: &[String], clubs: &[Club]) -> Vec<String> {
        if clubs.is_empty() {
            return Vec::new();
        }

        let prompt = format!(
            r#"You are an assistant that matches user interests to clubs.
User interests: {}
Here is a list of clubs:

{}
From the list above, return ONLY the club names (one per line) that best match the user's interests.
If no clubs match, respond with "none"."#,
            interests.join(", "),
            format_clubs_for_llm(clubs)
        );

        match self.llm.complete(Provider::Gemini, &prompt, "").await {
            Ok(reply) => split_club_names(&reply),
            Err(err) => {
                warn!("Club matching failed: {}", err);
                Vec::new()
            }
        }
    }
}

/// "sports, Music " -> ["sports", "music"]; the literal "none" means nothing
/// was extracted.
fn split_interests(reply: &str) -> Vec<String> {
    let trimmed = reply.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Vec::new();
    }

    trimmed
        .split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

fn split_club_names(reply: &str) -> Vec<String> {
    let trimmed = reply.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Vec::new();
    }

    trimmed
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Render clubs as LLM context lines.
fn format_clubs_for_llm(clubs: &[Club]) -> String {
    let mut formatted = String::new();
    for club in clubs {
        formatted.push_str(&format!(
            "Name: {}\n",
            club.name.as_deref().unwrap_or("Unknown")
        ));
        formatted.push_str(&format!(
            "Description: {}\n",
            club.description
                .as_deref()
                .unwrap_or("No description available")
        ));
        formatted.push_str(&format!(
            "Category: {}\n\n",
            club.category.as_deref().unwrap_or("Uncategorized")
        ));
    }
    formatted
}

/// Join the LLM's chosen names back onto the fetched rows by exact name.
fn select_matched(clubs: &[Club], names: &[String]) -> Vec<Club> {
    clubs
        .iter()
        .filter(|club| {
            club.name
                .as_deref()
                .map(|name| names.iter().any(|chosen| chosen == name))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn club(name: &str, category: &str) -> Club {
        Club {
            id: Some(format!("id-{}", name)),
            name: Some(name.to_string()),
            description: Some(format!("{} description", name)),
            category: Some(category.to_string()),
            location: None,
            meeting_time: None,
            website_url: None,
            leader_name: None,
            leader_contact: None,
        }
    }

    #[test]
    fn interests_split_and_normalize() {
        assert_eq!(
            split_interests(" Sports, Music "),
            vec!["sports".to_string(), "music".to_string()]
        );
    }

    #[test]
    fn none_reply_means_no_interests() {
        assert!(split_interests("none").is_empty());
        assert!(split_interests("None").is_empty());
        assert!(split_interests("  ").is_empty());
    }

    #[test]
    fn club_names_split_per_line() {
        assert_eq!(
            split_club_names("Chess Club\n  Hiking Club \n"),
            vec!["Chess Club".to_string(), "Hiking Club".to_string()]
        );
        assert!(split_club_names("none").is_empty());
    }

    #[test]
    fn matched_names_join_back_to_rows() {
        let clubs = vec![club("Chess Club", "Academics"), club("Hiking Club", "Sports")];
        let matched = select_matched(&clubs, &["Hiking Club".to_string()]);

        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name.as_deref(), Some("Hiking Club"));
    }

    #[test]
    fn unknown_names_match_nothing() {
        let clubs = vec![club("Chess Club", "Academics")];
        assert!(select_matched(&clubs, &["Drama Club".to_string()]).is_empty());
    }

    #[test]
    fn clubs_render_with_placeholders() {
        let mut bare = club("Art Club", "Arts");
        bare.description = None;
        let rendered = format_clubs_for_llm(&[bare]);

        assert!(rendered.contains("Name: Art Club"));
        assert!(rendered.contains("Description: No description available"));
    }
}
