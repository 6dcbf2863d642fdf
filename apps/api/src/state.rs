use std::sync::Arc;

use sqlx::PgPool;

use crate::evaluation::EvaluationHistory;
use crate::llm_client::CompletionBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Completion backend behind a trait object so tests can script replies.
    pub completions: Arc<dyn CompletionBackend>,
    /// Bounded history of evaluation runs. Created at startup, cleared by an
    /// explicit DELETE — never ambient process state.
    pub eval_history: Arc<EvaluationHistory>,
}
