use axum::{extract::State, http::StatusCode, Json};

use crate::errors::AppError;
use crate::evaluation::{
    compute_metrics, run_comprehensive, run_health_probe, run_messaging_suite,
    run_prompt_variation_suite, run_qualification_suite, ComprehensiveReport, EvaluationMetrics,
    EvaluationRecord, HealthReport, MessagingSuiteReport, PromptVariationReport,
    QualificationSuiteReport,
};
use crate::state::AppState;

/// POST /api/v1/evaluation/qualification
pub async fn handle_evaluate_qualification(
    State(state): State<AppState>,
) -> Result<Json<QualificationSuiteReport>, AppError> {
    let report = run_qualification_suite(state.completions.as_ref(), &state.eval_history).await;
    Ok(Json(report))
}

/// POST /api/v1/evaluation/messaging
pub async fn handle_evaluate_messaging(
    State(state): State<AppState>,
) -> Result<Json<MessagingSuiteReport>, AppError> {
    let report = run_messaging_suite(state.completions.as_ref(), &state.eval_history).await;
    Ok(Json(report))
}

/// POST /api/v1/evaluation/prompts
pub async fn handle_evaluate_prompts(
    State(state): State<AppState>,
) -> Result<Json<PromptVariationReport>, AppError> {
    let report = run_prompt_variation_suite(state.completions.as_ref(), &state.eval_history).await;
    Ok(Json(report))
}

/// POST /api/v1/evaluation/comprehensive
pub async fn handle_comprehensive_evaluation(
    State(state): State<AppState>,
) -> Result<Json<ComprehensiveReport>, AppError> {
    let report = run_comprehensive(state.completions.as_ref(), &state.eval_history).await;
    Ok(Json(report))
}

/// GET /api/v1/evaluation/health
pub async fn handle_evaluation_health(
    State(state): State<AppState>,
) -> Result<Json<HealthReport>, AppError> {
    Ok(Json(run_health_probe(state.completions.as_ref()).await))
}

/// GET /api/v1/evaluation/history
pub async fn handle_evaluation_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<EvaluationRecord>>, AppError> {
    Ok(Json(state.eval_history.list()))
}

/// DELETE /api/v1/evaluation/history
pub async fn handle_clear_history(State(state): State<AppState>) -> StatusCode {
    state.eval_history.clear();
    StatusCode::NO_CONTENT
}

/// GET /api/v1/evaluation/metrics
pub async fn handle_evaluation_metrics(
    State(state): State<AppState>,
) -> Result<Json<EvaluationMetrics>, AppError> {
    Ok(Json(compute_metrics(&state.eval_history)))
}
