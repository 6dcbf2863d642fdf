//! Messaging Composer — drafts personalized outreach text via the completion
//! backend.
//!
//! Every generator guarantees non-empty text: when the backend fails, a
//! deterministic template built purely from the lead's own fields takes over.

pub mod prompts;

use crate::llm_client::{ChatMessage, CompletionBackend, CompletionParams};
use crate::models::lead::LeadRow;

// Per-channel temperatures: creative for first-touch email/LinkedIn, steadier
// for follow-ups and meeting requests.
const EMAIL_TEMPERATURE: f64 = 0.7;
const LINKEDIN_TEMPERATURE: f64 = 0.7;
const FOLLOW_UP_TEMPERATURE: f64 = 0.6;
const MEETING_REQUEST_TEMPERATURE: f64 = 0.5;

/// Generates a personalized outreach email body.
pub async fn generate_email_message(
    backend: &dyn CompletionBackend,
    lead: &LeadRow,
    message_type: &str,
) -> String {
    let prompt = prompts::build_email_prompt(lead, message_type);
    match complete_at(backend, prompt, EMAIL_TEMPERATURE).await {
        Ok(reply) => clean_message(&reply),
        Err(e) => {
            tracing::error!("Error generating email message for lead {}: {e}", lead.id);
            fallback_email_message(lead, message_type)
        }
    }
}

/// Generates a short LinkedIn outreach message.
pub async fn generate_linkedin_message(
    backend: &dyn CompletionBackend,
    lead: &LeadRow,
    message_type: &str,
) -> String {
    let prompt = prompts::build_linkedin_prompt(lead, message_type);
    match complete_at(backend, prompt, LINKEDIN_TEMPERATURE).await {
        Ok(reply) => clean_message(&reply),
        Err(e) => {
            tracing::error!("Error generating LinkedIn message for lead {}: {e}", lead.id);
            fallback_linkedin_message(lead, message_type)
        }
    }
}

/// Generates a follow-up grounded in a previous interaction.
pub async fn generate_follow_up_message(
    backend: &dyn CompletionBackend,
    lead: &LeadRow,
    previous_activity: &str,
    message_type: &str,
) -> String {
    let prompt = prompts::build_follow_up_prompt(lead, previous_activity, message_type);
    match complete_at(backend, prompt, FOLLOW_UP_TEMPERATURE).await {
        Ok(reply) => clean_message(&reply),
        Err(e) => {
            tracing::error!("Error generating follow-up message for lead {}: {e}", lead.id);
            fallback_follow_up_message(lead, message_type)
        }
    }
}

/// Generates a meeting request around a proposed time.
pub async fn generate_meeting_request(
    backend: &dyn CompletionBackend,
    lead: &LeadRow,
    meeting_type: &str,
    proposed_time: &str,
) -> String {
    let prompt = prompts::build_meeting_request_prompt(lead, meeting_type, proposed_time);
    match complete_at(backend, prompt, MEETING_REQUEST_TEMPERATURE).await {
        Ok(reply) => clean_message(&reply),
        Err(e) => {
            tracing::error!("Error generating meeting request for lead {}: {e}", lead.id);
            fallback_meeting_request(lead, meeting_type, proposed_time)
        }
    }
}

async fn complete_at(
    backend: &dyn CompletionBackend,
    prompt: String,
    temperature: f64,
) -> Result<String, crate::llm_client::CompletionError> {
    let params = CompletionParams::with_temperature(temperature);
    backend.complete(&[ChatMessage::user(prompt)], params).await
}

/// Trims the reply and strips a leading "Here's …:" / "Here is …:" preamble
/// through the first colon, if one is present.
pub fn clean_message(message: &str) -> String {
    let cleaned = message.trim();

    if cleaned.starts_with("Here's") || cleaned.starts_with("Here is") {
        if let Some(idx) = cleaned.find(':') {
            return cleaned[idx + 1..].trim().to_string();
        }
    }

    cleaned.to_string()
}

// Fallback templates. Pure functions of the lead's fields and the type label
// so the same inputs always produce the same text.

fn company_or_generic(lead: &LeadRow) -> &str {
    lead.company_name.as_deref().unwrap_or("your company")
}

pub fn fallback_email_message(lead: &LeadRow, message_type: &str) -> String {
    format!(
        "Hi {},\n\n\
         I hope this message finds you well. I wanted to reach out regarding {}.\n\n\
         I'd love to learn more about your current challenges and see how we might be able to help.\n\n\
         Would you be available for a brief conversation this week?\n\n\
         Best regards,\n\
         Sales Team",
        lead.first_name, message_type
    )
}

pub fn fallback_linkedin_message(lead: &LeadRow, message_type: &str) -> String {
    format!(
        "Hi {}, I noticed your role at {}. I'd love to connect and share some insights \
         about {}. Would you be interested in a brief conversation?",
        lead.first_name,
        company_or_generic(lead),
        message_type
    )
}

pub fn fallback_follow_up_message(lead: &LeadRow, message_type: &str) -> String {
    format!(
        "Hi {},\n\n\
         Following up on our previous conversation about {}.\n\n\
         I wanted to share some additional information that might be relevant to your situation.\n\n\
         Would you like to schedule a follow-up call to discuss further?\n\n\
         Best regards,\n\
         Sales Team",
        lead.first_name, message_type
    )
}

pub fn fallback_meeting_request(lead: &LeadRow, meeting_type: &str, proposed_time: &str) -> String {
    format!(
        "Hi {},\n\n\
         I'd like to schedule a {} to discuss how we can help {} achieve your goals.\n\n\
         I'm available {}. Would this work for you?\n\n\
         Best regards,\n\
         Sales Team",
        lead.first_name,
        meeting_type,
        company_or_generic(lead),
        proposed_time
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedBackend;
    use crate::models::lead::PipelineStage;
    use chrono::Utc;
    use uuid::Uuid;

    fn make_lead() -> LeadRow {
        LeadRow {
            id: Uuid::new_v4(),
            first_name: "Jane".to_string(),
            last_name: "Smith".to_string(),
            email: "jane@startupcorp.com".to_string(),
            phone: None,
            title: Some("CTO".to_string()),
            company_name: Some("StartupCorp".to_string()),
            company_size: None,
            industry: Some("SaaS".to_string()),
            location: Some("Austin, TX".to_string()),
            linkedin_url: None,
            website: None,
            qualification_score: None,
            qualification_reasoning: None,
            pipeline_stage: PipelineStage::New,
            last_contact_date: None,
            next_follow_up_date: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn clean_message_trims_whitespace() {
        assert_eq!(clean_message("  hello  \n"), "hello");
    }

    #[test]
    fn clean_message_strips_heres_preamble() {
        assert_eq!(
            clean_message("Here's a personalized email: Hi Jane, welcome."),
            "Hi Jane, welcome."
        );
        assert_eq!(
            clean_message("Here is the message:\nHi Jane."),
            "Hi Jane."
        );
    }

    #[test]
    fn clean_message_without_colon_is_unchanged() {
        assert_eq!(clean_message("Here's something odd"), "Here's something odd");
    }

    #[test]
    fn clean_message_leaves_ordinary_text_alone() {
        assert_eq!(clean_message("Hi Jane: quick question"), "Hi Jane: quick question");
    }

    #[test]
    fn fallbacks_are_deterministic() {
        let lead = make_lead();
        assert_eq!(
            fallback_email_message(&lead, "initial outreach"),
            fallback_email_message(&lead, "initial outreach")
        );
        assert_eq!(
            fallback_linkedin_message(&lead, "connection request"),
            fallback_linkedin_message(&lead, "connection request")
        );
        assert_eq!(
            fallback_meeting_request(&lead, "demo", "Tuesday at 2pm"),
            fallback_meeting_request(&lead, "demo", "Tuesday at 2pm")
        );
    }

    #[test]
    fn fallbacks_use_lead_fields() {
        let lead = make_lead();
        let email = fallback_email_message(&lead, "initial outreach");
        assert!(email.starts_with("Hi Jane,"));
        assert!(email.contains("initial outreach"));

        let linkedin = fallback_linkedin_message(&lead, "connection request");
        assert!(linkedin.contains("StartupCorp"));
    }

    #[test]
    fn linkedin_fallback_handles_missing_company() {
        let mut lead = make_lead();
        lead.company_name = None;
        let msg = fallback_linkedin_message(&lead, "connection request");
        assert!(msg.contains("your company"));
    }

    #[tokio::test]
    async fn email_generation_cleans_backend_reply() {
        let backend = ScriptedBackend::replying("Here's your email: Hi Jane, quick note.");
        let msg = generate_email_message(&backend, &make_lead(), "initial outreach").await;
        assert_eq!(msg, "Hi Jane, quick note.");
    }

    #[tokio::test]
    async fn email_generation_falls_back_on_failure() {
        let backend = ScriptedBackend::failing();
        let lead = make_lead();
        let msg = generate_email_message(&backend, &lead, "initial outreach").await;
        assert_eq!(msg, fallback_email_message(&lead, "initial outreach"));
    }

    #[tokio::test]
    async fn follow_up_generation_falls_back_on_failure() {
        let backend = ScriptedBackend::failing();
        let lead = make_lead();
        let msg =
            generate_follow_up_message(&backend, &lead, "intro call", "technical follow-up").await;
        assert_eq!(msg, fallback_follow_up_message(&lead, "technical follow-up"));
    }

    #[tokio::test]
    async fn meeting_request_falls_back_on_failure() {
        let backend = ScriptedBackend::failing();
        let lead = make_lead();
        let msg = generate_meeting_request(&backend, &lead, "demo", "Tuesday at 2pm").await;
        assert_eq!(msg, fallback_meeting_request(&lead, "demo", "Tuesday at 2pm"));
    }

    #[test]
    fn email_prompt_includes_company_size_only_when_present() {
        let mut lead = make_lead();
        let prompt = prompts::build_email_prompt(&lead, "initial outreach");
        assert!(!prompt.contains("Company Size"));

        lead.company_size = Some("50-100".to_string());
        let prompt = prompts::build_email_prompt(&lead, "initial outreach");
        assert!(prompt.contains("Company Size: 50-100"));
    }
}
