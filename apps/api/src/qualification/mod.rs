//! Qualification Composer — scores a lead via the completion backend.
//!
//! Qualification never returns an error to its caller: every failure mode
//! (transport, timeout, malformed reply) degrades to a documented default
//! result. Callers persist the score/reasoning onto the lead separately.

pub mod prompts;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::llm_client::{ChatMessage, CompletionBackend, CompletionParams};
use crate::models::lead::LeadRow;

/// Low temperature favors consistent scoring across calls.
const QUALIFICATION_TEMPERATURE: f64 = 0.3;

const DEFAULT_SCORE: i32 = 50;
const DEFAULT_REASONING: &str = "Unable to parse response";
const DEFAULT_RECOMMENDATIONS: &str = "Contact lead for more information";

const ERROR_REASONING: &str = "Unable to qualify lead due to technical error";
const ERROR_RECOMMENDATIONS: &str = "Manual review required";

/// Transient value object produced fresh on each qualification call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualificationResult {
    pub score: i32,
    pub reasoning: String,
    pub recommendations: String,
}

impl QualificationResult {
    fn technical_error() -> Self {
        Self {
            score: DEFAULT_SCORE,
            reasoning: ERROR_REASONING.to_string(),
            recommendations: ERROR_RECOMMENDATIONS.to_string(),
        }
    }

    /// True when this result came from the backend-failure path rather than
    /// a parsed reply.
    pub fn is_technical_error(&self) -> bool {
        self.reasoning == ERROR_REASONING
    }
}

/// Scores a lead against the fixed rubric.
pub async fn qualify_lead(backend: &dyn CompletionBackend, lead: &LeadRow) -> QualificationResult {
    let prompt = prompts::build_qualification_prompt(lead);
    run_qualification(backend, lead, prompt).await
}

/// Re-scores a lead against caller-supplied criteria. An empty criteria list
/// still produces a well-formed result.
pub async fn requalify_lead(
    backend: &dyn CompletionBackend,
    lead: &LeadRow,
    criteria: &[(String, Value)],
) -> QualificationResult {
    let prompt = prompts::build_custom_qualification_prompt(lead, criteria);
    run_qualification(backend, lead, prompt).await
}

async fn run_qualification(
    backend: &dyn CompletionBackend,
    lead: &LeadRow,
    prompt: String,
) -> QualificationResult {
    let params = CompletionParams::with_temperature(QUALIFICATION_TEMPERATURE);

    match backend.complete(&[ChatMessage::user(prompt)], params).await {
        Ok(reply) => parse_qualification_response(&reply),
        Err(e) => {
            tracing::error!("Error qualifying lead {}: {e}", lead.id);
            QualificationResult::technical_error()
        }
    }
}

/// Parses the reply line-by-line for SCORE:/REASONING:/RECOMMENDATIONS:
/// prefixes (case-sensitive, one value per line). A later duplicate label
/// overwrites an earlier one; each missing field keeps its default.
///
/// The score is clamped to [0, 100]; a non-numeric score line is ignored
/// with a warning and the prior value retained.
pub fn parse_qualification_response(response: &str) -> QualificationResult {
    let mut score = DEFAULT_SCORE;
    let mut reasoning = DEFAULT_REASONING.to_string();
    let mut recommendations = DEFAULT_RECOMMENDATIONS.to_string();

    for line in response.lines() {
        if let Some(rest) = line.strip_prefix("SCORE:") {
            match rest.trim().parse::<i32>() {
                Ok(n) => score = n.clamp(0, 100),
                Err(_) => warn!("Could not parse score from response line: {line}"),
            }
        } else if let Some(rest) = line.strip_prefix("REASONING:") {
            reasoning = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("RECOMMENDATIONS:") {
            recommendations = rest.trim().to_string();
        }
    }

    QualificationResult {
        score,
        reasoning,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedBackend;
    use crate::models::lead::PipelineStage;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn make_lead() -> LeadRow {
        LeadRow {
            id: Uuid::new_v4(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john.doe@techcorp.com".to_string(),
            phone: None,
            title: Some("VP of Engineering".to_string()),
            company_name: Some("TechCorp Inc".to_string()),
            company_size: Some("1000+".to_string()),
            industry: Some("Technology".to_string()),
            location: Some("San Francisco, CA".to_string()),
            linkedin_url: None,
            website: Some("https://techcorp.com".to_string()),
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

    fn make_empty_lead() -> LeadRow {
        LeadRow {
            title: None,
            company_name: None,
            company_size: None,
            industry: None,
            location: None,
            website: None,
            ..make_lead()
        }
    }

    #[test]
    fn parses_well_formed_reply() {
        let result = parse_qualification_response(
            "SCORE: 85\nREASONING: Strong title and company fit.\nRECOMMENDATIONS: Book a demo.",
        );
        assert_eq!(result.score, 85);
        assert_eq!(result.reasoning, "Strong title and company fit.");
        assert_eq!(result.recommendations, "Book a demo.");
    }

    #[test]
    fn score_above_range_clamps_to_100() {
        let result = parse_qualification_response("SCORE: 150\nREASONING: r\nRECOMMENDATIONS: x");
        assert_eq!(result.score, 100);
    }

    #[test]
    fn negative_score_clamps_to_0() {
        let result = parse_qualification_response("SCORE: -5\nREASONING: r\nRECOMMENDATIONS: x");
        assert_eq!(result.score, 0);
    }

    #[test]
    fn missing_score_line_keeps_default() {
        let result = parse_qualification_response("REASONING: only reasoning here");
        assert_eq!(result.score, 50);
        assert_eq!(result.reasoning, "only reasoning here");
        assert_eq!(result.recommendations, "Contact lead for more information");
    }

    #[test]
    fn non_numeric_score_retains_prior_value() {
        let result = parse_qualification_response("SCORE: ninety\nREASONING: r");
        assert_eq!(result.score, 50);
    }

    #[test]
    fn empty_reply_yields_all_defaults() {
        let result = parse_qualification_response("");
        assert_eq!(result.score, 50);
        assert_eq!(result.reasoning, "Unable to parse response");
        assert_eq!(result.recommendations, "Contact lead for more information");
    }

    #[test]
    fn duplicate_labels_last_occurrence_wins() {
        // Pins the existing parser behavior: a later duplicate silently
        // overwrites an earlier one.
        let result = parse_qualification_response("SCORE: 10\nSCORE: 90\nREASONING: r");
        assert_eq!(result.score, 90);
    }

    #[test]
    fn labels_are_case_sensitive() {
        let result = parse_qualification_response("score: 90\nReasoning: nope");
        assert_eq!(result.score, 50);
        assert_eq!(result.reasoning, "Unable to parse response");
    }

    #[test]
    fn prompt_substitutes_not_specified_for_absent_fields() {
        let lead = make_empty_lead();
        let prompt = prompts::build_qualification_prompt(&lead);
        assert!(prompt.contains("Title: Not specified"));
        assert!(prompt.contains("Company: Not specified"));
        assert!(prompt.contains("Company Size: Not specified"));
        assert!(prompt.contains("Industry: Not specified"));
        assert!(prompt.contains("Location: Not specified"));
        assert!(prompt.contains("Website: Not specified"));
        assert!(prompt.contains("LinkedIn: Not specified"));
    }

    #[test]
    fn prompt_omits_blank_notes() {
        let mut lead = make_lead();
        lead.notes = Some("   ".to_string());
        let prompt = prompts::build_qualification_prompt(&lead);
        assert!(!prompt.contains("Additional Notes"));

        lead.notes = Some("Met at conference".to_string());
        let prompt = prompts::build_qualification_prompt(&lead);
        assert!(prompt.contains("Additional Notes: Met at conference"));
    }

    #[test]
    fn both_prompts_carry_the_response_format_instructions() {
        let lead = make_lead();
        for prompt in [
            prompts::build_qualification_prompt(&lead),
            prompts::build_custom_qualification_prompt(&lead, &[]),
        ] {
            assert!(prompt.contains("SCORE: [number from 0-100]"));
            assert!(prompt.contains("REASONING: ["));
            assert!(prompt.contains("RECOMMENDATIONS: ["));
        }
    }

    #[test]
    fn custom_criteria_render_in_request_order() {
        // Depends on serde_json's preserve_order feature; the request body's
        // key order must survive into the prompt bullets.
        let body: serde_json::Map<String, Value> =
            serde_json::from_str(r#"{"Zeta criterion":"z","Alpha criterion":"a"}"#).unwrap();
        let criteria: Vec<(String, Value)> = body.into_iter().collect();

        let prompt = prompts::build_custom_qualification_prompt(&make_lead(), &criteria);
        let zeta = prompt.find("- Zeta criterion: z").unwrap();
        let alpha = prompt.find("- Alpha criterion: a").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn custom_prompt_renders_criteria_as_bullets() {
        let lead = make_lead();
        let criteria = vec![
            ("Budget".to_string(), json!("over $100k")),
            ("Team size".to_string(), json!(25)),
        ];
        let prompt = prompts::build_custom_qualification_prompt(&lead, &criteria);
        assert!(prompt.contains("- Budget: over $100k"));
        assert!(prompt.contains("- Team size: 25"));
    }

    #[tokio::test]
    async fn qualify_lead_parses_backend_reply() {
        let backend =
            ScriptedBackend::replying("SCORE: 72\nREASONING: Good fit.\nRECOMMENDATIONS: Call.");
        let result = qualify_lead(&backend, &make_lead()).await;
        assert_eq!(result.score, 72);
        assert_eq!(result.reasoning, "Good fit.");
    }

    #[tokio::test]
    async fn backend_failure_yields_technical_error_result() {
        let backend = ScriptedBackend::failing();
        let result = qualify_lead(&backend, &make_lead()).await;
        assert_eq!(result.score, 50);
        assert_eq!(result.reasoning, "Unable to qualify lead due to technical error");
        assert_eq!(result.recommendations, "Manual review required");
    }

    #[tokio::test]
    async fn requalify_with_empty_criteria_is_well_formed() {
        let backend = ScriptedBackend::replying("SCORE: 40\nREASONING: r\nRECOMMENDATIONS: x");
        let result = requalify_lead(&backend, &make_lead(), &[]).await;
        assert_eq!(result.score, 40);
    }
}
