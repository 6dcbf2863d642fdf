//! Synthetic leads used by the evaluation harness. Never persisted.

use chrono::Utc;
use uuid::Uuid;

use crate::models::lead::{LeadRow, PipelineStage};

fn lead(
    first_name: &str,
    last_name: &str,
    email: &str,
    title: &str,
    company: &str,
    company_size: Option<&str>,
    industry: &str,
    location: Option<&str>,
) -> LeadRow {
    LeadRow {
        id: Uuid::new_v4(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        phone: None,
        title: Some(title.to_string()),
        company_name: Some(company.to_string()),
        company_size: company_size.map(str::to_string),
        industry: Some(industry.to_string()),
        location: location.map(str::to_string),
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

/// A small fixed spread of profiles: enterprise, startup, and mid-market.
pub fn fixture_leads() -> Vec<LeadRow> {
    vec![
        lead(
            "John",
            "Doe",
            "john.doe@techcorp.example",
            "VP of Engineering",
            "TechCorp Inc",
            Some("1000+"),
            "Technology",
            Some("San Francisco, CA"),
        ),
        lead(
            "Jane",
            "Smith",
            "jane.smith@startupcorp.example",
            "CTO",
            "StartupCorp",
            Some("11-50"),
            "SaaS",
            Some("Austin, TX"),
        ),
        lead(
            "Mike",
            "Johnson",
            "mike.johnson@growthcorp.example",
            "CEO",
            "Growth Corp",
            None,
            "Marketing",
            None,
        ),
        lead(
            "Sarah",
            "Wilson",
            "sarah.wilson@enterprise.example",
            "Director of Operations",
            "Enterprise Solutions",
            Some("201-500"),
            "Consulting",
            Some("Chicago, IL"),
        ),
    ]
}
