use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Kind of interaction logged against a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "activity_type", rename_all = "snake_case")]
pub enum ActivityType {
    Email,
    Call,
    Linkedin,
    Meeting,
    Demo,
    FollowUp,
    Proposal,
    Negotiation,
    Note,
}

impl ActivityType {
    pub const ALL: [ActivityType; 9] = [
        ActivityType::Email,
        ActivityType::Call,
        ActivityType::Linkedin,
        ActivityType::Meeting,
        ActivityType::Demo,
        ActivityType::FollowUp,
        ActivityType::Proposal,
        ActivityType::Negotiation,
        ActivityType::Note,
    ];

    /// Wire name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityType::Email => "EMAIL",
            ActivityType::Call => "CALL",
            ActivityType::Linkedin => "LINKEDIN",
            ActivityType::Meeting => "MEETING",
            ActivityType::Demo => "DEMO",
            ActivityType::FollowUp => "FOLLOW_UP",
            ActivityType::Proposal => "PROPOSAL",
            ActivityType::Negotiation => "NEGOTIATION",
            ActivityType::Note => "NOTE",
        }
    }

    /// Whether logging this activity counts as contacting the lead.
    pub fn is_contact(self) -> bool {
        matches!(
            self,
            ActivityType::Call | ActivityType::Email | ActivityType::Meeting
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityRow {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub activity_type: ActivityType,
    pub description: String,
    pub outcome: Option<String>,
    pub next_steps: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating or replacing an activity.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityPayload {
    pub lead_id: Uuid,
    pub activity_type: ActivityType,
    pub description: String,
    pub outcome: Option<String>,
    pub next_steps: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_types_are_call_email_meeting() {
        assert!(ActivityType::Call.is_contact());
        assert!(ActivityType::Email.is_contact());
        assert!(ActivityType::Meeting.is_contact());
        assert!(!ActivityType::Linkedin.is_contact());
        assert!(!ActivityType::Note.is_contact());
    }

    #[test]
    fn wire_names_round_trip_through_serde() {
        for ty in ActivityType::ALL {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty.as_str()));
            let back: ActivityType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, ty);
        }
    }
}
