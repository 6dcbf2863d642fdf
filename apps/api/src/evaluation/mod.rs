//! Evaluation Harness — batch-exercises the composers against fixture leads
//! and keeps a bounded history of past runs.
//!
//! This is a diagnostic feature, not production logic: it checks only that
//! calls return, and how fast, never the quality of the AI output.

pub mod fixtures;
pub mod handlers;

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::llm_client::{ChatMessage, CompletionBackend, CompletionParams};
use crate::messaging;
use crate::qualification;

const MESSAGE_TYPES: [&str; 4] = [
    "initial outreach",
    "follow-up",
    "meeting request",
    "proposal follow-up",
];

const PROMPT_VARIATIONS: [&str; 4] = [
    "You are an expert sales development representative...",
    "As a senior sales professional with 10+ years experience...",
    "You are a data-driven sales analyst evaluating leads...",
    "You are a consultative sales expert focused on value creation...",
];

/// One retained evaluation run.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRecord {
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    pub results: Value,
}

/// Bounded append-only store of evaluation runs. Created once at startup and
/// handed to the handlers through `AppState`; oldest runs fall off when the
/// capacity is reached, and `clear` empties it on demand.
pub struct EvaluationHistory {
    capacity: usize,
    runs: Mutex<VecDeque<EvaluationRecord>>,
}

impl EvaluationHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            runs: Mutex::new(VecDeque::new()),
        }
    }

    pub fn record(&self, kind: &str, results: Value) {
        let mut runs = self.runs.lock().unwrap();
        if runs.len() == self.capacity {
            runs.pop_front();
        }
        runs.push_back(EvaluationRecord {
            kind: kind.to_string(),
            timestamp: Utc::now(),
            results,
        });
    }

    pub fn list(&self) -> Vec<EvaluationRecord> {
        self.runs.lock().unwrap().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.runs.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.runs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Serialize)]
pub struct QualificationTestResult {
    pub lead_name: String,
    pub company: Option<String>,
    pub score: i32,
    pub reasoning: String,
    pub success: bool,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct QualificationSuiteReport {
    pub test_results: Vec<QualificationTestResult>,
    pub total_tests: usize,
    pub average_score: f64,
    pub success_rate: f64,
    pub average_latency_ms: f64,
}

/// Qualifies every fixture lead and reports per-lead score and latency.
pub async fn run_qualification_suite(
    backend: &dyn CompletionBackend,
    history: &EvaluationHistory,
) -> QualificationSuiteReport {
    let leads = fixtures::fixture_leads();
    let mut test_results = Vec::with_capacity(leads.len());

    for lead in &leads {
        let started = Instant::now();
        let result = qualification::qualify_lead(backend, lead).await;
        test_results.push(QualificationTestResult {
            lead_name: lead.full_name(),
            company: lead.company_name.clone(),
            score: result.score,
            success: !result.is_technical_error(),
            reasoning: result.reasoning,
            latency_ms: started.elapsed().as_millis() as u64,
        });
    }

    let report = QualificationSuiteReport {
        total_tests: test_results.len(),
        average_score: mean(test_results.iter().map(|r| r.score as f64)),
        success_rate: mean(
            test_results
                .iter()
                .map(|r| if r.success { 1.0 } else { 0.0 }),
        ),
        average_latency_ms: mean(test_results.iter().map(|r| r.latency_ms as f64)),
        test_results,
    };

    history.record("qualification", to_value(&report));
    report
}

#[derive(Debug, Serialize)]
pub struct MessagingTestResult {
    pub lead_name: String,
    pub message_type: String,
    pub message_length: usize,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct MessagingSuiteReport {
    pub test_results: Vec<MessagingTestResult>,
    pub total_tests: usize,
    pub average_message_length: f64,
    pub average_latency_ms: f64,
}

/// Generates an email for every fixture lead across all message-type labels.
pub async fn run_messaging_suite(
    backend: &dyn CompletionBackend,
    history: &EvaluationHistory,
) -> MessagingSuiteReport {
    let leads = fixtures::fixture_leads();
    let mut test_results = Vec::with_capacity(leads.len() * MESSAGE_TYPES.len());

    for lead in &leads {
        for message_type in MESSAGE_TYPES {
            let started = Instant::now();
            let message = messaging::generate_email_message(backend, lead, message_type).await;
            test_results.push(MessagingTestResult {
                lead_name: lead.full_name(),
                message_type: message_type.to_string(),
                message_length: message.len(),
                latency_ms: started.elapsed().as_millis() as u64,
            });
        }
    }

    let report = MessagingSuiteReport {
        total_tests: test_results.len(),
        average_message_length: mean(test_results.iter().map(|r| r.message_length as f64)),
        average_latency_ms: mean(test_results.iter().map(|r| r.latency_ms as f64)),
        test_results,
    };

    history.record("messaging", to_value(&report));
    report
}

#[derive(Debug, Serialize)]
pub struct PromptVariationResult {
    pub variation: usize,
    pub prompt: String,
    pub response_length: usize,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct PromptVariationReport {
    pub test_results: Vec<PromptVariationResult>,
    pub total_tests: usize,
    pub average_response_length: f64,
    pub average_latency_ms: f64,
}

/// Sends the persona prompt variations against one fixture lead.
pub async fn run_prompt_variation_suite(
    backend: &dyn CompletionBackend,
    history: &EvaluationHistory,
) -> PromptVariationReport {
    let lead = &fixtures::fixture_leads()[0];
    let mut test_results = Vec::with_capacity(PROMPT_VARIATIONS.len());

    for (i, variation) in PROMPT_VARIATIONS.iter().enumerate() {
        let prompt = format!(
            "{variation} Please evaluate this lead: {} at {}",
            lead.full_name(),
            lead.company_name.as_deref().unwrap_or("Not specified")
        );
        let started = Instant::now();
        let response = backend
            .complete_or_unavailable(&[ChatMessage::user(prompt)], CompletionParams::default())
            .await;
        test_results.push(PromptVariationResult {
            variation: i + 1,
            prompt: variation.to_string(),
            response_length: response.len(),
            latency_ms: started.elapsed().as_millis() as u64,
        });
    }

    let report = PromptVariationReport {
        total_tests: test_results.len(),
        average_response_length: mean(test_results.iter().map(|r| r.response_length as f64)),
        average_latency_ms: mean(test_results.iter().map(|r| r.latency_ms as f64)),
        test_results,
    };

    history.record("prompt_variations", to_value(&report));
    report
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub api_connection: bool,
    pub status: String,
    pub probe_latency_ms: u64,
}

/// Connectivity probe plus round-trip timing.
pub async fn run_health_probe(backend: &dyn CompletionBackend) -> HealthReport {
    let started = Instant::now();
    let connected = backend.test_connection().await;
    HealthReport {
        api_connection: connected,
        status: if connected { "Healthy" } else { "Unhealthy" }.to_string(),
        probe_latency_ms: started.elapsed().as_millis() as u64,
    }
}

#[derive(Debug, Serialize)]
pub struct ComprehensiveReport {
    pub health: HealthReport,
    pub qualification: QualificationSuiteReport,
    pub messaging: MessagingSuiteReport,
    pub prompt_variations: PromptVariationReport,
    pub total_evaluations: usize,
}

/// Runs the probe and all three suites back to back.
pub async fn run_comprehensive(
    backend: &dyn CompletionBackend,
    history: &EvaluationHistory,
) -> ComprehensiveReport {
    let health = run_health_probe(backend).await;
    let qualification = run_qualification_suite(backend, history).await;
    let messaging = run_messaging_suite(backend, history).await;
    let prompt_variations = run_prompt_variation_suite(backend, history).await;

    ComprehensiveReport {
        health,
        qualification,
        messaging,
        prompt_variations,
        total_evaluations: history.len(),
    }
}

#[derive(Debug, Serialize)]
pub struct EvaluationMetrics {
    pub total_runs: usize,
    pub runs_by_kind: HashMap<String, usize>,
    /// Mean of the success rates reported by retained runs, where the run
    /// kind reports one. None when no retained run does.
    pub success_rate: Option<f64>,
    pub last_run_at: Option<DateTime<Utc>>,
}

/// Aggregates over whatever history is currently retained.
pub fn compute_metrics(history: &EvaluationHistory) -> EvaluationMetrics {
    let runs = history.list();

    let mut runs_by_kind: HashMap<String, usize> = HashMap::new();
    for run in &runs {
        *runs_by_kind.entry(run.kind.clone()).or_insert(0) += 1;
    }

    let rates: Vec<f64> = runs
        .iter()
        .filter_map(|r| r.results.get("success_rate").and_then(Value::as_f64))
        .collect();
    let success_rate = if rates.is_empty() {
        None
    } else {
        Some(mean(rates.into_iter()))
    };

    EvaluationMetrics {
        total_runs: runs.len(),
        last_run_at: runs.last().map(|r| r.timestamp),
        success_rate,
        runs_by_kind,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn to_value<T: Serialize>(report: &T) -> Value {
    serde_json::to_value(report).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedBackend;
    use crate::llm_client::CompletionError;
    use serde_json::json;

    #[test]
    fn history_is_bounded_and_drops_oldest() {
        let history = EvaluationHistory::new(2);
        history.record("a", json!(1));
        history.record("b", json!(2));
        history.record("c", json!(3));

        let runs = history.list();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].kind, "b");
        assert_eq!(runs[1].kind, "c");
    }

    #[test]
    fn clear_empties_the_history() {
        let history = EvaluationHistory::new(10);
        history.record("a", json!(1));
        assert!(!history.is_empty());
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn metrics_count_runs_by_kind() {
        let history = EvaluationHistory::new(10);
        history.record("qualification", json!({}));
        history.record("qualification", json!({}));
        history.record("messaging", json!({}));

        let metrics = compute_metrics(&history);
        assert_eq!(metrics.total_runs, 3);
        assert_eq!(metrics.runs_by_kind["qualification"], 2);
        assert_eq!(metrics.runs_by_kind["messaging"], 1);
        assert!(metrics.last_run_at.is_some());
    }

    #[test]
    fn mean_of_empty_iterator_is_zero() {
        assert_eq!(mean(std::iter::empty()), 0.0);
    }

    #[tokio::test]
    async fn qualification_suite_covers_all_fixtures_and_records_history() {
        let replies: Vec<Result<String, CompletionError>> = (0..fixtures::fixture_leads().len())
            .map(|_| Ok("SCORE: 60\nREASONING: r\nRECOMMENDATIONS: x".to_string()))
            .collect();
        let backend = ScriptedBackend::new(replies);
        let history = EvaluationHistory::new(10);

        let report = run_qualification_suite(&backend, &history).await;
        assert_eq!(report.total_tests, fixtures::fixture_leads().len());
        assert_eq!(report.average_score, 60.0);
        assert_eq!(report.success_rate, 1.0);
        assert_eq!(history.len(), 1);
        assert_eq!(history.list()[0].kind, "qualification");
    }

    #[tokio::test]
    async fn qualification_suite_reports_zero_success_rate_when_backend_is_down() {
        let backend = ScriptedBackend::failing();
        let history = EvaluationHistory::new(10);

        let report = run_qualification_suite(&backend, &history).await;
        assert_eq!(report.success_rate, 0.0);
        assert!(report.test_results.iter().all(|r| !r.success));

        let metrics = compute_metrics(&history);
        assert_eq!(metrics.success_rate, Some(0.0));
    }

    #[tokio::test]
    async fn messaging_suite_degrades_to_fallbacks_when_backend_is_down() {
        // Every call fails; the suite still completes because the composer
        // substitutes deterministic fallbacks.
        let backend = ScriptedBackend::failing();
        let history = EvaluationHistory::new(10);

        let report = run_messaging_suite(&backend, &history).await;
        assert_eq!(report.total_tests, fixtures::fixture_leads().len() * 4);
        assert!(report.average_message_length > 0.0);
    }

    #[tokio::test]
    async fn health_probe_reports_unhealthy_on_failure() {
        let backend = ScriptedBackend::failing();
        let report = run_health_probe(&backend).await;
        assert!(!report.api_connection);
        assert_eq!(report.status, "Unhealthy");
    }
}
