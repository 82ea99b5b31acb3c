use crate::models::{ChatRecord, ClubFacts, Event, Faq};
use crate::services::supabase::SupabaseClient;
use log::warn;

/// Fixed website-navigation context served to students for Website/Both
/// questions.
pub static WEBSITE_STUDENT_CONTEXT: &str = r#"----CONTEXT START----
Website Instructions

Account Management (Guest Access)
- To register a new account: Click the Register button.
- To log in to your account: Click the Login button.

Clubs (Guest & Logged-in Access)
- Guests can browse clubs via the Clubs tab in the navigation bar.
- Logged-in users can view more club details and join clubs by clicking View Details.

Events (Guest & Logged-in Access)
- Guests and users can view upcoming events via the Events tab.
- Only logged-in users who are members of a club can join or leave events.

Announcements (Logged-in Only)
- The Announcements tab displays posts and updates shared by clubs.
- Only logged-in users can view announcements.

Messages (Logged-in Only)
- The Messages tab allows communication between users.
- Available only when logged in.

Profile & Settings (Logged-in Only)
- To edit your profile or change your password:
  Click the Profile icon in the top right, then select Profile.
- To change language settings:
  Click the Profile icon in the top right, then select Settings.

Summary:
- Guests can register, log in, view clubs, and browse events.
- Logged-in users can join clubs, participate in events, view announcements, message users, and manage their profile and settings.
----CONTEXT END----

STRICT MODE:
- Keep replies under 3 short sentences.
"#;

/// Fixed capabilities context served to club managers.
pub static WEBSITE_MANAGER_CONTEXT: &str = r#"----CONTEXT START----
You are a Club Manager Assistant. Use ONLY the information below.

1. Club Info
   - View & update name, banners, description, category.

2. Events
   - Add, edit, delete events (date, time, description).

3. Announcements
   - Add/edit/delete announcements.
   - Attach files (PDFs, images).
   - Delete inappropriate comments.

4. Members
   - View member list.
   - Remove members.

5. Join Requests
   - Review each request with reason.
   - Approve or decline.

6. FAQ
   - Add/edit/delete Q&As.
   - Powers the student chatbot.

----CONTEXT END----
STRICT MODE:
- Only answer using CONTEXT.
- No extra details or speculation.
- If out of scope: respond exactly:
  "Out of my scope; try logging in as a student to access the student chatbot."
- Keep replies under 3 short sentences.
"#;

/// Appended to the final-answer context regardless of classification.
pub static ANSWER_RULES: &str = "\nIMPORTANT: Keep your answers concise and to the point. Avoid lengthy explanations.\nSTRICTLY FOLLOW CONTEXT RULES!\n";

/// Assembles prompt context strings from the relational backend. Fetch
/// failures degrade to the documented placeholder lines instead of erroring.
#[derive(Debug, Clone)]
pub struct ContextService {
    supabase: SupabaseClient,
}

impl ContextService {
    pub fn new(supabase: SupabaseClient) -> Self {
        Self { supabase }
    }

    /// Build the club context block: club facts, FAQs, events, and the
    /// greeting instruction for a known username.
    pub async fn club_context(&self, club_id: &str, user_id: &str) -> String {
        let (club, faqs, events, username) = futures::join!(
            self.supabase.get_club_by_id(club_id),
            self.supabase.fetch_faqs_by_club(club_id),
            self.supabase.fetch_events_by_club(club_id),
            self.supabase.fetch_username_by_id(user_id),
        );

        let facts = match club {
            Ok(Some(club)) => ClubFacts::from(club),
            Ok(None) => ClubFacts::default(),
            Err(err) => {
                warn!("Failed to fetch club {}: {}", club_id, err);
                ClubFacts::default()
            }
        };
        let faqs = faqs.unwrap_or_else(|err| {
            warn!("Failed to fetch FAQs for club {}: {}", club_id, err);
            Vec::new()
        });
        let events = events.unwrap_or_else(|err| {
            warn!("Failed to fetch events for club {}: {}", club_id, err);
            Vec::new()
        });
        let username = username.unwrap_or_else(|err| {
            warn!("Failed to fetch username for user {}: {}", user_id, err);
            "Guest".to_string()
        });

        render_club_context(&facts, &faqs, &events, &username)
    }
}

/// Render the club context string. Pure so the layout is testable without a
/// backend.
pub fn render_club_context(
    facts: &ClubFacts,
    faqs: &[Faq],
    events: &[Event],
    username: &str,
) -> String {
    let mut context = String::new();

    context.push_str(&format!("Club Name: {}\n", facts.name));
    context.push_str(&format!("Description: {}\n", facts.description));
    context.push_str(&format!("Category: {}\n", facts.category));
    context.push_str(&format!("Location: {}\n", facts.location));
    context.push_str(&format!("Website: {}\n\n", facts.website_url));

    context.push_str("To contact the club manager, press contact club in the clubs page.\n");
    context.push_str("- Keep replies under 3 short sentences.\n\n");

    if faqs.is_empty() {
        context.push_str("No FAQs found for this club.\n\n");
    } else {
        context.push_str("Frequently Asked Questions:\n\n");
        for (i, faq) in faqs.iter().enumerate() {
            context.push_str(&format!("Q{}: {}\n", i + 1, faq.question));
            context.push_str(&format!("A{}: {}\n\n", i + 1, faq.answer));
        }
    }

    if events.is_empty() {
        context.push_str("No events found for this club.\n\n");
    } else {
        context.push_str("Upcoming Events:\n\n");
        for (i, event) in events.iter().enumerate() {
            context.push_str(&format!("Event {}:\n", i + 1));
            context.push_str(&format!(
                "  Title: {}\n",
                event.title.as_deref().unwrap_or("Untitled")
            ));
            context.push_str(&format!(
                "  Description: {}\n",
                event.description.as_deref().unwrap_or("No description")
            ));
            context.push_str(&format!(
                "  Location: {}\n",
                event.location.as_deref().unwrap_or("Unknown")
            ));
            context.push_str(&format!(
                "  Time Range: {}\n",
                event.time_range.as_deref().unwrap_or("Unknown")
            ));
            context.push_str(&format!(
                "  Start Date: {}\n",
                event.start_date.as_deref().unwrap_or("Unknown")
            ));
            context.push_str(&format!(
                "  End Date: {}\n",
                event.end_date.as_deref().unwrap_or("Unknown")
            ));
            context.push_str(&format!(
                "  Status: {}\n\n",
                event.status.as_deref().unwrap_or("Unknown")
            ));
        }
    }

    context.push_str(&format!("User Name: {}\n\n", username));
    context.push_str("If there is a username, greet and reply using the username in the response.\n\n");

    context
}

/// Render recent chat history as conversation lines for prompt context.
pub fn render_history(records: &[ChatRecord]) -> String {
    let mut rendered = String::new();
    for record in records {
        rendered.push_str(&format!("User: {}\n", record.question));
        rendered.push_str(&format!("Assistant: {}\n", record.answer));
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_facts() -> ClubFacts {
        ClubFacts {
            name: "Chess Club".to_string(),
            description: "Weekly chess practice and tournaments.".to_string(),
            category: "Academics".to_string(),
            location: "Room 12".to_string(),
            website_url: "https://example.org/chess".to_string(),
            leader_name: "Sam".to_string(),
            leader_contact: "sam@example.org".to_string(),
        }
    }

    #[test]
    fn empty_faqs_and_events_render_fallback_lines() {
        let context = render_club_context(&sample_facts(), &[], &[], "Guest");

        assert!(context.contains("Club Name: Chess Club"));
        assert!(context.contains("No FAQs found for this club."));
        assert!(context.contains("No events found for this club."));
        assert!(context.contains("User Name: Guest"));
    }

    #[test]
    fn faqs_are_numbered_from_one() {
        let faqs = vec![
            Faq {
                question: "Who can join?".to_string(),
                answer: "Anyone.".to_string(),
            },
            Faq {
                question: "When are meetings?".to_string(),
                answer: "Fridays.".to_string(),
            },
        ];
        let context = render_club_context(&sample_facts(), &faqs, &[], "Alex");

        assert!(context.contains("Q1: Who can join?"));
        assert!(context.contains("A2: Fridays."));
        assert!(!context.contains("No FAQs found"));
    }

    #[test]
    fn events_render_with_placeholder_columns() {
        let events = vec![Event {
            title: Some("Open Night".to_string()),
            description: None,
            location: Some("Hall A".to_string()),
            time_range: None,
            start_date: Some("2025-09-01".to_string()),
            end_date: None,
            status: Some("upcoming".to_string()),
        }];
        let context = render_club_context(&sample_facts(), &[], &events, "Alex");

        assert!(context.contains("Event 1:"));
        assert!(context.contains("  Title: Open Night"));
        assert!(context.contains("  Description: No description"));
        assert!(context.contains("  Status: upcoming"));
    }

    #[test]
    fn history_renders_as_conversation_lines() {
        let records = vec![
            ChatRecord::new("s1", "u1", "What is this club?", "A chess club."),
            ChatRecord::new("s1", "u1", "Can I join it?", "Yes, via the website."),
        ];
        let rendered = render_history(&records);

        assert_eq!(
            rendered,
            "User: What is this club?\nAssistant: A chess club.\nUser: Can I join it?\nAssistant: Yes, via the website.\n"
        );
    }

    #[test]
    fn website_contexts_carry_strict_mode_markers() {
        assert!(WEBSITE_STUDENT_CONTEXT.contains("----CONTEXT START----"));
        assert!(WEBSITE_STUDENT_CONTEXT.contains("STRICT MODE:"));
        assert!(WEBSITE_MANAGER_CONTEXT.contains("Out of my scope"));
    }
}
