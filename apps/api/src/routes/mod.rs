pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::activities::handlers as activities;
use crate::evaluation::handlers as evaluation;
use crate::leads::handlers as leads;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Leads
        .route(
            "/api/v1/leads",
            get(leads::handle_list_leads).post(leads::handle_create_lead),
        )
        .route("/api/v1/leads/follow-up", get(leads::handle_leads_needing_follow_up))
        .route("/api/v1/leads/stats/pipeline", get(leads::handle_pipeline_stats))
        .route("/api/v1/leads/pipeline/:stage", get(leads::handle_leads_by_stage))
        .route(
            "/api/v1/leads/:id",
            get(leads::handle_get_lead)
                .put(leads::handle_update_lead)
                .delete(leads::handle_delete_lead),
        )
        .route("/api/v1/leads/:id/qualify", post(leads::handle_qualify_lead))
        .route("/api/v1/leads/:id/requalify", post(leads::handle_requalify_lead))
        .route("/api/v1/leads/:id/messages/email", post(leads::handle_generate_email))
        .route(
            "/api/v1/leads/:id/messages/linkedin",
            post(leads::handle_generate_linkedin),
        )
        .route(
            "/api/v1/leads/:id/messages/follow-up",
            post(leads::handle_generate_follow_up),
        )
        .route(
            "/api/v1/leads/:id/messages/meeting-request",
            post(leads::handle_generate_meeting_request),
        )
        .route(
            "/api/v1/leads/:id/pipeline-stage",
            put(leads::handle_update_pipeline_stage),
        )
        .route(
            "/api/v1/leads/:id/pipeline-stage/advance",
            post(leads::handle_advance_pipeline_stage),
        )
        .route(
            "/api/v1/leads/:id/activities",
            get(activities::handle_activities_for_lead),
        )
        .route(
            "/api/v1/leads/:id/activities/stats",
            get(activities::handle_activity_stats),
        )
        // Activities
        .route(
            "/api/v1/activities",
            get(activities::handle_list_activities).post(activities::handle_create_activity),
        )
        .route("/api/v1/activities/recent", get(activities::handle_recent_activities))
        .route("/api/v1/activities/overdue", get(activities::handle_overdue_activities))
        .route(
            "/api/v1/activities/type/:activity_type",
            get(activities::handle_activities_by_type),
        )
        .route(
            "/api/v1/activities/:id",
            get(activities::handle_get_activity)
                .put(activities::handle_update_activity)
                .delete(activities::handle_delete_activity),
        )
        .route(
            "/api/v1/activities/:id/complete",
            put(activities::handle_complete_activity),
        )
        // Evaluation harness
        .route(
            "/api/v1/evaluation/qualification",
            post(evaluation::handle_evaluate_qualification),
        )
        .route(
            "/api/v1/evaluation/messaging",
            post(evaluation::handle_evaluate_messaging),
        )
        .route("/api/v1/evaluation/prompts", post(evaluation::handle_evaluate_prompts))
        .route(
            "/api/v1/evaluation/comprehensive",
            post(evaluation::handle_comprehensive_evaluation),
        )
        .route("/api/v1/evaluation/health", get(evaluation::handle_evaluation_health))
        .route(
            "/api/v1/evaluation/history",
            get(evaluation::handle_evaluation_history).delete(evaluation::handle_clear_history),
        )
        .route("/api/v1/evaluation/metrics", get(evaluation::handle_evaluation_metrics))
        .with_state(state)
}
