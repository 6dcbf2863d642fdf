//! Channel-specific prompt construction for outreach messages.

use crate::models::lead::LeadRow;
use crate::qualification::prompts::NOT_SPECIFIED;

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_SPECIFIED)
}

/// Email outreach: professional tone, under 150 words, clear call-to-action.
pub fn build_email_prompt(lead: &LeadRow, message_type: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are an expert sales development representative writing a personalized email. \
         Create a professional, engaging email that feels personal and relevant to the \
         recipient.\n\n",
    );

    prompt.push_str("Lead Information:\n");
    prompt.push_str(&format!("Name: {}\n", lead.full_name()));
    prompt.push_str(&format!("Title: {}\n", field(&lead.title)));
    prompt.push_str(&format!("Company: {}\n", field(&lead.company_name)));
    prompt.push_str(&format!("Industry: {}\n", field(&lead.industry)));
    prompt.push_str(&format!("Location: {}\n", field(&lead.location)));
    if let Some(size) = &lead.company_size {
        prompt.push_str(&format!("Company Size: {size}\n"));
    }

    prompt.push_str(&format!("\nMessage Type: {message_type}\n\n"));

    prompt.push_str("Guidelines:\n");
    prompt.push_str("- Keep it concise (under 150 words)\n");
    prompt.push_str("- Use a professional but friendly tone\n");
    prompt.push_str("- Include a clear value proposition\n");
    prompt.push_str("- End with a specific call-to-action\n");
    prompt.push_str("- Personalize based on their role and company\n");
    prompt.push_str("- Avoid generic sales language\n\n");

    prompt.push_str("Write only the email body content, no subject line or signatures needed.");
    prompt
}

/// LinkedIn outreach: shorter and more casual than email, under 100 words.
pub fn build_linkedin_prompt(lead: &LeadRow, message_type: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are writing a personalized LinkedIn message for sales outreach. \
         LinkedIn messages should be shorter and more casual than emails.\n\n",
    );

    prompt.push_str("Lead Information:\n");
    prompt.push_str(&format!("Name: {}\n", lead.full_name()));
    prompt.push_str(&format!("Title: {}\n", field(&lead.title)));
    prompt.push_str(&format!("Company: {}\n", field(&lead.company_name)));
    prompt.push_str(&format!("Industry: {}\n", field(&lead.industry)));

    prompt.push_str(&format!("\nMessage Type: {message_type}\n\n"));

    prompt.push_str("Guidelines:\n");
    prompt.push_str("- Keep it under 100 words\n");
    prompt.push_str("- Use a conversational tone\n");
    prompt.push_str("- Reference something specific about their profile or company\n");
    prompt.push_str("- Include a soft call-to-action\n");
    prompt.push_str("- Avoid being too salesy\n\n");

    prompt.push_str("Write only the message content.");
    prompt
}

/// Follow-up grounded in a previous interaction.
pub fn build_follow_up_prompt(lead: &LeadRow, previous_activity: &str, message_type: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are writing a follow-up message based on a previous interaction. \
         Make it relevant to what was discussed before.\n\n",
    );

    prompt.push_str("Lead Information:\n");
    prompt.push_str(&format!("Name: {}\n", lead.full_name()));
    prompt.push_str(&format!("Title: {}\n", field(&lead.title)));
    prompt.push_str(&format!("Company: {}\n", field(&lead.company_name)));

    prompt.push_str(&format!("\nPrevious Activity: {previous_activity}\n"));
    prompt.push_str(&format!("Follow-up Type: {message_type}\n\n"));

    prompt.push_str("Guidelines:\n");
    prompt.push_str("- Reference the previous interaction\n");
    prompt.push_str("- Provide additional value or information\n");
    prompt.push_str("- Keep it relevant and timely\n");
    prompt.push_str("- Include a clear next step\n\n");

    prompt.push_str("Write the follow-up message content.");
    prompt
}

/// Meeting request with a proposed time.
pub fn build_meeting_request_prompt(
    lead: &LeadRow,
    meeting_type: &str,
    proposed_time: &str,
) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are requesting a meeting with a potential client. \
         Make it professional and provide clear value for the meeting.\n\n",
    );

    prompt.push_str("Lead Information:\n");
    prompt.push_str(&format!("Name: {}\n", lead.full_name()));
    prompt.push_str(&format!("Title: {}\n", field(&lead.title)));
    prompt.push_str(&format!("Company: {}\n", field(&lead.company_name)));

    prompt.push_str(&format!("\nMeeting Type: {meeting_type}\n"));
    prompt.push_str(&format!("Proposed Time: {proposed_time}\n\n"));

    prompt.push_str("Guidelines:\n");
    prompt.push_str("- Explain the value of the meeting\n");
    prompt.push_str("- Be specific about what will be discussed\n");
    prompt.push_str("- Offer flexibility in scheduling\n");
    prompt.push_str("- Keep it professional and respectful\n\n");

    prompt.push_str("Write the meeting request message.");
    prompt
}
