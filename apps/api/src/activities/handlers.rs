use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::activities::repo;
use crate::errors::AppError;
use crate::leads::repo as leads_repo;
use crate::models::activity::{ActivityPayload, ActivityRow, ActivityType};
use crate::state::AppState;

const RECENT_LIMIT: i64 = 20;

/// GET /api/v1/activities
pub async fn handle_list_activities(
    State(state): State<AppState>,
) -> Result<Json<Vec<ActivityRow>>, AppError> {
    Ok(Json(repo::find_all(&state.db).await?))
}

/// GET /api/v1/activities/:id
pub async fn handle_get_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActivityRow>, AppError> {
    repo::find_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Activity {id} not found")))
}

/// POST /api/v1/activities
///
/// Verifies the referenced lead exists, then records the activity. Logging a
/// contact-type activity refreshes the lead's last contact date.
pub async fn handle_create_activity(
    State(state): State<AppState>,
    Json(payload): Json<ActivityPayload>,
) -> Result<(StatusCode, Json<ActivityRow>), AppError> {
    if payload.description.trim().is_empty() {
        return Err(AppError::Validation(
            "Activity description is required".to_string(),
        ));
    }

    let lead = leads_repo::find_by_id(&state.db, payload.lead_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lead {} not found", payload.lead_id)))?;

    let activity = repo::insert(&state.db, &payload).await?;

    if payload.activity_type.is_contact() {
        leads_repo::touch_last_contact(&state.db, lead.id).await?;
    }

    info!(
        "Created new activity with id: {} for lead: {}",
        activity.id, lead.id
    );
    Ok((StatusCode::CREATED, Json(activity)))
}

/// PUT /api/v1/activities/:id
pub async fn handle_update_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ActivityPayload>,
) -> Result<Json<ActivityRow>, AppError> {
    if payload.description.trim().is_empty() {
        return Err(AppError::Validation(
            "Activity description is required".to_string(),
        ));
    }

    let updated = repo::update(&state.db, id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Activity {id} not found")))?;

    info!("Updated activity with id: {id}");
    Ok(Json(updated))
}

/// DELETE /api/v1/activities/:id
pub async fn handle_delete_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repo::delete(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Activity {id} not found")));
    }
    info!("Deleted activity with id: {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/activities/recent
pub async fn handle_recent_activities(
    State(state): State<AppState>,
) -> Result<Json<Vec<ActivityRow>>, AppError> {
    Ok(Json(repo::find_recent(&state.db, RECENT_LIMIT).await?))
}

/// GET /api/v1/activities/type/:activity_type
///
/// An unknown type name is not an error: it logs a warning and returns an
/// empty list.
pub async fn handle_activities_by_type(
    State(state): State<AppState>,
    Path(activity_type): Path<String>,
) -> Result<Json<Vec<ActivityRow>>, AppError> {
    let parsed: Option<ActivityType> =
        serde_json::from_value(Value::String(activity_type.to_uppercase())).ok();

    match parsed {
        Some(ty) => Ok(Json(repo::find_by_type(&state.db, ty).await?)),
        None => {
            warn!("Invalid activity type: {activity_type}");
            Ok(Json(Vec::new()))
        }
    }
}

/// GET /api/v1/activities/overdue
pub async fn handle_overdue_activities(
    State(state): State<AppState>,
) -> Result<Json<Vec<ActivityRow>>, AppError> {
    Ok(Json(repo::find_overdue(&state.db).await?))
}

/// PUT /api/v1/activities/:id/complete
pub async fn handle_complete_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActivityRow>, AppError> {
    let updated = repo::mark_completed(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Activity {id} not found")))?;

    info!("Marked activity {id} as completed");
    Ok(Json(updated))
}

/// GET /api/v1/leads/:id/activities
pub async fn handle_activities_for_lead(
    State(state): State<AppState>,
    Path(lead_id): Path<Uuid>,
) -> Result<Json<Vec<ActivityRow>>, AppError> {
    leads_repo::find_by_id(&state.db, lead_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lead {lead_id} not found")))?;

    Ok(Json(repo::find_by_lead(&state.db, lead_id).await?))
}

#[derive(Debug, Serialize)]
pub struct ActivityStats {
    pub total_activities: usize,
    pub activities_by_type: HashMap<String, u64>,
    pub last_activity_date: Option<DateTime<Utc>>,
    pub last_activity_type: Option<String>,
    pub completed_activities: usize,
    pub pending_activities: usize,
}

/// GET /api/v1/leads/:id/activities/stats
pub async fn handle_activity_stats(
    State(state): State<AppState>,
    Path(lead_id): Path<Uuid>,
) -> Result<Json<ActivityStats>, AppError> {
    leads_repo::find_by_id(&state.db, lead_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lead {lead_id} not found")))?;

    let activities = repo::find_by_lead(&state.db, lead_id).await?;
    Ok(Json(compute_activity_stats(&activities)))
}

/// Pure aggregation over a lead's activities, newest first.
fn compute_activity_stats(activities: &[ActivityRow]) -> ActivityStats {
    let mut by_type: HashMap<String, u64> = HashMap::new();
    for activity in activities {
        *by_type
            .entry(activity.activity_type.as_str().to_string())
            .or_insert(0) += 1;
    }

    let completed = activities
        .iter()
        .filter(|a| a.completed_date.is_some())
        .count();

    let last = activities.iter().max_by_key(|a| a.created_at);

    ActivityStats {
        total_activities: activities.len(),
        activities_by_type: by_type,
        last_activity_date: last.map(|a| a.created_at),
        last_activity_type: last.map(|a| a.activity_type.as_str().to_string()),
        completed_activities: completed,
        pending_activities: activities.len() - completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_activity(ty: ActivityType, completed: bool, age_hours: i64) -> ActivityRow {
        let created = Utc::now() - Duration::hours(age_hours);
        ActivityRow {
            id: Uuid::new_v4(),
            lead_id: Uuid::new_v4(),
            activity_type: ty,
            description: "test".to_string(),
            outcome: None,
            next_steps: None,
            scheduled_date: None,
            completed_date: completed.then(Utc::now),
            created_by: None,
            created_at: created,
        }
    }

    #[test]
    fn stats_on_empty_list_are_all_zero() {
        let stats = compute_activity_stats(&[]);
        assert_eq!(stats.total_activities, 0);
        assert!(stats.activities_by_type.is_empty());
        assert!(stats.last_activity_date.is_none());
        assert_eq!(stats.pending_activities, 0);
    }

    #[test]
    fn stats_count_by_type_and_completion() {
        let activities = vec![
            make_activity(ActivityType::Call, true, 5),
            make_activity(ActivityType::Call, false, 3),
            make_activity(ActivityType::Email, false, 1),
        ];
        let stats = compute_activity_stats(&activities);
        assert_eq!(stats.total_activities, 3);
        assert_eq!(stats.activities_by_type["CALL"], 2);
        assert_eq!(stats.activities_by_type["EMAIL"], 1);
        assert_eq!(stats.completed_activities, 1);
        assert_eq!(stats.pending_activities, 2);
    }

    #[test]
    fn stats_pick_newest_activity_as_last() {
        let activities = vec![
            make_activity(ActivityType::Call, false, 10),
            make_activity(ActivityType::Note, false, 1),
        ];
        let stats = compute_activity_stats(&activities);
        assert_eq!(stats.last_activity_type.as_deref(), Some("NOTE"));
    }
}
