use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::leads::repo::{self, LeadSearch};
use crate::messaging;
use crate::models::lead::{LeadPayload, LeadRow, PipelineStage};
use crate::qualification::{self, QualificationResult};
use crate::state::AppState;

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db)
        if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation))
}

fn validate(payload: &LeadPayload) -> Result<(), AppError> {
    if payload.first_name.trim().is_empty() {
        return Err(AppError::Validation("First name is required".to_string()));
    }
    if payload.last_name.trim().is_empty() {
        return Err(AppError::Validation("Last name is required".to_string()));
    }
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }
    Ok(())
}

async fn load_lead(state: &AppState, id: Uuid) -> Result<LeadRow, AppError> {
    repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lead {id} not found")))
}

#[derive(Debug, Deserialize)]
pub struct LeadSearchQuery {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub pipeline_stage: Option<PipelineStage>,
}

/// GET /api/v1/leads
pub async fn handle_list_leads(
    State(state): State<AppState>,
    Query(params): Query<LeadSearchQuery>,
) -> Result<Json<Vec<LeadRow>>, AppError> {
    let filters = LeadSearch {
        first_name: params.first_name,
        last_name: params.last_name,
        company_name: params.company_name,
        industry: params.industry,
        pipeline_stage: params.pipeline_stage,
    };
    Ok(Json(repo::search(&state.db, &filters).await?))
}

/// GET /api/v1/leads/:id
pub async fn handle_get_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LeadRow>, AppError> {
    Ok(Json(load_lead(&state, id).await?))
}

/// POST /api/v1/leads
pub async fn handle_create_lead(
    State(state): State<AppState>,
    Json(payload): Json<LeadPayload>,
) -> Result<(StatusCode, Json<LeadRow>), AppError> {
    validate(&payload)?;

    let lead = repo::insert(&state.db, &payload).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Validation("A lead with this email already exists".to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    info!("Created new lead with id: {}", lead.id);
    Ok((StatusCode::CREATED, Json(lead)))
}

/// PUT /api/v1/leads/:id
pub async fn handle_update_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LeadPayload>,
) -> Result<Json<LeadRow>, AppError> {
    validate(&payload)?;

    let updated = repo::update(&state.db, id, &payload).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Validation("A lead with this email already exists".to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    let lead = updated.ok_or_else(|| AppError::NotFound(format!("Lead {id} not found")))?;
    info!("Updated lead with id: {id}");
    Ok(Json(lead))
}

/// DELETE /api/v1/leads/:id
pub async fn handle_delete_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repo::delete(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Lead {id} not found")));
    }
    info!("Deleted lead with id: {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/leads/:id/qualify
///
/// Runs the qualification composer and persists the score/reasoning onto the
/// lead. The composer itself never fails; only lookup/persistence errors
/// surface here.
pub async fn handle_qualify_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QualificationResult>, AppError> {
    let lead = load_lead(&state, id).await?;

    let result = qualification::qualify_lead(state.completions.as_ref(), &lead).await;
    repo::update_qualification(&state.db, id, result.score, &result.reasoning).await?;

    info!("Qualified lead {id} with score: {}", result.score);
    Ok(Json(result))
}

/// POST /api/v1/leads/:id/requalify
pub async fn handle_requalify_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(criteria): Json<Map<String, Value>>,
) -> Result<Json<QualificationResult>, AppError> {
    let lead = load_lead(&state, id).await?;

    let criteria: Vec<(String, Value)> = criteria.into_iter().collect();
    let result = qualification::requalify_lead(state.completions.as_ref(), &lead, &criteria).await;
    repo::update_qualification(&state.db, id, result.score, &result.reasoning).await?;

    info!("Re-qualified lead {id} with score: {}", result.score);
    Ok(Json(result))
}

#[derive(Debug, Deserialize, Default)]
pub struct MessageRequest {
    pub message_type: Option<String>,
}

/// POST /api/v1/leads/:id/messages/email
pub async fn handle_generate_email(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<Value>, AppError> {
    let lead = load_lead(&state, id).await?;
    let message_type = req.message_type.as_deref().unwrap_or("initial outreach");

    let message =
        messaging::generate_email_message(state.completions.as_ref(), &lead, message_type).await;
    Ok(Json(json!({ "message": message })))
}

/// POST /api/v1/leads/:id/messages/linkedin
pub async fn handle_generate_linkedin(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<Value>, AppError> {
    let lead = load_lead(&state, id).await?;
    let message_type = req.message_type.as_deref().unwrap_or("connection request");

    let message =
        messaging::generate_linkedin_message(state.completions.as_ref(), &lead, message_type).await;
    Ok(Json(json!({ "message": message })))
}

#[derive(Debug, Deserialize)]
pub struct FollowUpRequest {
    pub previous_activity: String,
    pub message_type: Option<String>,
}

/// POST /api/v1/leads/:id/messages/follow-up
pub async fn handle_generate_follow_up(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<FollowUpRequest>,
) -> Result<Json<Value>, AppError> {
    let lead = load_lead(&state, id).await?;
    let message_type = req.message_type.as_deref().unwrap_or("follow-up");

    let message = messaging::generate_follow_up_message(
        state.completions.as_ref(),
        &lead,
        &req.previous_activity,
        message_type,
    )
    .await;
    Ok(Json(json!({ "message": message })))
}

#[derive(Debug, Deserialize)]
pub struct MeetingRequest {
    pub meeting_type: Option<String>,
    pub proposed_time: Option<String>,
}

/// POST /api/v1/leads/:id/messages/meeting-request
pub async fn handle_generate_meeting_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MeetingRequest>,
) -> Result<Json<Value>, AppError> {
    let lead = load_lead(&state, id).await?;
    let meeting_type = req.meeting_type.as_deref().unwrap_or("introductory call");
    let proposed_time = req.proposed_time.as_deref().unwrap_or("this week");

    let message = messaging::generate_meeting_request(
        state.completions.as_ref(),
        &lead,
        meeting_type,
        proposed_time,
    )
    .await;
    Ok(Json(json!({ "message": message })))
}

#[derive(Debug, Deserialize)]
pub struct PipelineStageUpdate {
    pub pipeline_stage: PipelineStage,
}

/// PUT /api/v1/leads/:id/pipeline-stage
pub async fn handle_update_pipeline_stage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PipelineStageUpdate>,
) -> Result<Json<LeadRow>, AppError> {
    let updated = repo::set_pipeline_stage(&state.db, id, req.pipeline_stage)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lead {id} not found")))?;

    info!(
        "Updated pipeline stage for lead {id} to {}",
        req.pipeline_stage.as_str()
    );
    Ok(Json(updated))
}

/// POST /api/v1/leads/:id/pipeline-stage/advance
///
/// Moves the lead to its successor stage; terminal stages stay put.
pub async fn handle_advance_pipeline_stage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LeadRow>, AppError> {
    let lead = load_lead(&state, id).await?;
    let next = lead.pipeline_stage.next();

    if next == lead.pipeline_stage {
        return Ok(Json(lead));
    }

    let updated = repo::set_pipeline_stage(&state.db, id, next)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lead {id} not found")))?;

    info!(
        "Advanced lead {id} from {} to {}",
        lead.pipeline_stage.as_str(),
        next.as_str()
    );
    Ok(Json(updated))
}

/// GET /api/v1/leads/pipeline/:stage
pub async fn handle_leads_by_stage(
    State(state): State<AppState>,
    Path(stage): Path<PipelineStage>,
) -> Result<Json<Vec<LeadRow>>, AppError> {
    Ok(Json(repo::find_by_stage(&state.db, stage).await?))
}

/// GET /api/v1/leads/follow-up
pub async fn handle_leads_needing_follow_up(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeadRow>>, AppError> {
    Ok(Json(repo::find_needing_follow_up(&state.db).await?))
}

/// GET /api/v1/leads/stats/pipeline
///
/// Lead count per pipeline stage, every stage present even when zero.
pub async fn handle_pipeline_stats(
    State(state): State<AppState>,
) -> Result<Json<HashMap<String, i64>>, AppError> {
    let mut stats = HashMap::new();
    for stage in PipelineStage::ALL {
        let count = repo::count_by_stage(&state.db, stage).await?;
        stats.insert(stage.as_str().to_string(), count);
    }
    Ok(Json(stats))
}
