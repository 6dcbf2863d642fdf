//! Prompt construction for lead qualification.
//! Each LLM-calling module carries its own `prompts.rs`.

use serde_json::Value;

use crate::models::lead::LeadRow;

/// Placeholder rendered for every absent lead attribute.
pub const NOT_SPECIFIED: &str = "Not specified";

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_SPECIFIED)
}

/// Renders the fixed-rubric qualification prompt. The rubric allocates
/// weighted points across seven categories summing to 100, and the response
/// format instructions drive the SCORE/REASONING/RECOMMENDATIONS parser.
pub fn build_qualification_prompt(lead: &LeadRow) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are an expert sales development representative analyzing a potential lead. \
         Please evaluate the following lead and provide a qualification score from 0-100, \
         where 100 is a perfect fit and 0 is not qualified at all.\n\n",
    );

    prompt.push_str("Lead Information:\n");
    prompt.push_str(&format!("Name: {}\n", lead.full_name()));
    prompt.push_str(&format!("Title: {}\n", field(&lead.title)));
    prompt.push_str(&format!("Company: {}\n", field(&lead.company_name)));
    prompt.push_str(&format!("Company Size: {}\n", field(&lead.company_size)));
    prompt.push_str(&format!("Industry: {}\n", field(&lead.industry)));
    prompt.push_str(&format!("Location: {}\n", field(&lead.location)));
    prompt.push_str(&format!("Website: {}\n", field(&lead.website)));
    prompt.push_str(&format!("LinkedIn: {}\n", field(&lead.linkedin_url)));

    if let Some(notes) = lead.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        prompt.push_str(&format!("Additional Notes: {notes}\n"));
    }

    prompt.push_str("\nEvaluation Criteria:\n");
    prompt.push_str("1. Company size and growth potential (20 points)\n");
    prompt.push_str("2. Industry alignment with our target markets (20 points)\n");
    prompt.push_str("3. Decision-making authority based on title (20 points)\n");
    prompt.push_str("4. Contact information completeness (10 points)\n");
    prompt.push_str("5. Geographic location relevance (10 points)\n");
    prompt.push_str("6. Online presence and credibility (10 points)\n");
    prompt.push_str("7. Overall fit and potential (10 points)\n\n");

    prompt.push_str(&response_format_instructions(
        "detailed explanation of your scoring decision",
    ));
    prompt
}

/// Renders the re-qualification prompt: same lead block, but each custom
/// criterion becomes a bullet instead of the fixed rubric. An empty criteria
/// list still yields a well-formed prompt.
pub fn build_custom_qualification_prompt(lead: &LeadRow, criteria: &[(String, Value)]) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are an expert sales development representative analyzing a potential lead. \
         Please evaluate the following lead using the custom criteria provided and give \
         a score from 0-100.\n\n",
    );

    prompt.push_str("Lead Information:\n");
    prompt.push_str(&format!("Name: {}\n", lead.full_name()));
    prompt.push_str(&format!("Title: {}\n", field(&lead.title)));
    prompt.push_str(&format!("Company: {}\n", field(&lead.company_name)));
    prompt.push_str(&format!("Company Size: {}\n", field(&lead.company_size)));
    prompt.push_str(&format!("Industry: {}\n", field(&lead.industry)));
    prompt.push_str(&format!("Location: {}\n", field(&lead.location)));

    prompt.push_str("\nCustom Evaluation Criteria:\n");
    for (name, value) in criteria {
        prompt.push_str(&format!("- {name}: {}\n", render_criterion_value(value)));
    }

    prompt.push('\n');
    prompt.push_str(&response_format_instructions(
        "detailed explanation based on custom criteria",
    ));
    prompt
}

fn response_format_instructions(reasoning_hint: &str) -> String {
    format!(
        "Please respond in the following format:\n\
         SCORE: [number from 0-100]\n\
         REASONING: [{reasoning_hint}]\n\
         RECOMMENDATIONS: [specific next steps for this lead]\n"
    )
}

/// JSON strings render bare; everything else renders as compact JSON.
fn render_criterion_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
