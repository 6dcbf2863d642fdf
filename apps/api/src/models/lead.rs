use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Position of a lead in the fixed sales-progression sequence.
///
/// Stored as the `pipeline_stage` Postgres enum; serialized in
/// SCREAMING_SNAKE_CASE on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "pipeline_stage", rename_all = "snake_case")]
pub enum PipelineStage {
    New,
    Contacted,
    Qualified,
    Engaged,
    MeetingScheduled,
    Converted,
    ClosedLost,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 7] = [
        PipelineStage::New,
        PipelineStage::Contacted,
        PipelineStage::Qualified,
        PipelineStage::Engaged,
        PipelineStage::MeetingScheduled,
        PipelineStage::Converted,
        PipelineStage::ClosedLost,
    ];

    /// The next logical stage in the progression. Terminal stages map to
    /// themselves.
    pub fn next(self) -> PipelineStage {
        match self {
            PipelineStage::New => PipelineStage::Contacted,
            PipelineStage::Contacted => PipelineStage::Qualified,
            PipelineStage::Qualified => PipelineStage::Engaged,
            PipelineStage::Engaged => PipelineStage::MeetingScheduled,
            PipelineStage::MeetingScheduled => PipelineStage::Converted,
            PipelineStage::Converted | PipelineStage::ClosedLost => self,
        }
    }

    /// False only for the two terminal stages.
    pub fn is_active(self) -> bool {
        !matches!(self, PipelineStage::Converted | PipelineStage::ClosedLost)
    }

    /// Wire name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::New => "NEW",
            PipelineStage::Contacted => "CONTACTED",
            PipelineStage::Qualified => "QUALIFIED",
            PipelineStage::Engaged => "ENGAGED",
            PipelineStage::MeetingScheduled => "MEETING_SCHEDULED",
            PipelineStage::Converted => "CONVERTED",
            PipelineStage::ClosedLost => "CLOSED_LOST",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeadRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub company_size: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub linkedin_url: Option<String>,
    pub website: Option<String>,
    pub qualification_score: Option<i32>,
    pub qualification_reasoning: Option<String>,
    pub pipeline_stage: PipelineStage,
    pub last_contact_date: Option<DateTime<Utc>>,
    pub next_follow_up_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeadRow {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Request body for creating or replacing a lead. Qualification fields are
/// not settable here — they are written only by the qualify actions.
#[derive(Debug, Clone, Deserialize)]
pub struct LeadPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub company_size: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub linkedin_url: Option<String>,
    pub website: Option<String>,
    pub pipeline_stage: Option<PipelineStage>,
    pub last_contact_date: Option<DateTime<Utc>>,
    pub next_follow_up_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_progression_follows_the_pipeline_order() {
        assert_eq!(PipelineStage::New.next(), PipelineStage::Contacted);
        assert_eq!(PipelineStage::Contacted.next(), PipelineStage::Qualified);
        assert_eq!(PipelineStage::Qualified.next(), PipelineStage::Engaged);
        assert_eq!(
            PipelineStage::Engaged.next(),
            PipelineStage::MeetingScheduled
        );
        assert_eq!(
            PipelineStage::MeetingScheduled.next(),
            PipelineStage::Converted
        );
    }

    #[test]
    fn terminal_stages_map_to_themselves() {
        assert_eq!(PipelineStage::Converted.next(), PipelineStage::Converted);
        assert_eq!(PipelineStage::ClosedLost.next(), PipelineStage::ClosedLost);
    }

    #[test]
    fn only_terminal_stages_are_inactive() {
        for stage in PipelineStage::ALL {
            let expected =
                !matches!(stage, PipelineStage::Converted | PipelineStage::ClosedLost);
            assert_eq!(stage.is_active(), expected, "stage {stage:?}");
        }
    }

    #[test]
    fn wire_names_round_trip_through_serde() {
        for stage in PipelineStage::ALL {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage.as_str()));
            let back: PipelineStage = serde_json::from_str(&json).unwrap();
            assert_eq!(back, stage);
        }
    }
}
