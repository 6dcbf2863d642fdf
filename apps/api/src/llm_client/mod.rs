//! Completion Client — the single point of entry for all Grok API calls.
//!
//! ARCHITECTURAL RULE: No other module may call the chat-completions endpoint
//! directly. All LLM interactions MUST go through `CompletionBackend`.
//!
//! The backend is a trait object so the composers and their tests can run
//! against a scripted in-memory implementation instead of the network.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::Config;

/// Fixed sentinel returned wherever the "always a string" contract applies.
/// Callers that need to distinguish failure use the fallible `complete`.
pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "AI service is currently unavailable. Please try again later.";

/// Canned probe message for connectivity checks.
const PROBE_MESSAGE: &str =
    "Hello, this is a test message. Please respond with 'Connection successful'.";
const PROBE_ACK: &str = "connection successful";

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Completion returned no choices")]
    EmptyChoices,
}

/// A single role/content message in a chat-completion conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Per-call model parameters. Each composer picks its own temperature;
/// unset fields fall back to the backend's configured defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionParams {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl CompletionParams {
    pub fn with_temperature(temperature: f64) -> Self {
        Self {
            temperature: Some(temperature),
            max_tokens: None,
        }
    }

    fn resolve(self, default_temperature: f64, default_max_tokens: u32) -> (f64, u32) {
        (
            self.temperature.unwrap_or(default_temperature),
            self.max_tokens.unwrap_or(default_max_tokens),
        )
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [ChatMessage],
    model: &'a str,
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// The completion seam carried in `AppState` as `Arc<dyn CompletionBackend>`.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Sends one bounded synchronous chat-completion call and returns the
    /// first choice's message content. No retries — a failed call resolves
    /// immediately so the caller can fall back.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: CompletionParams,
    ) -> Result<String, CompletionError>;

    /// Infallible variant: absorbs every failure into the fixed
    /// unavailability sentinel. Used by the diagnostic paths.
    async fn complete_or_unavailable(
        &self,
        messages: &[ChatMessage],
        params: CompletionParams,
    ) -> String {
        match self.complete(messages, params).await {
            Ok(text) => text,
            Err(e) => {
                error!("Completion call failed, returning unavailability sentinel: {e}");
                SERVICE_UNAVAILABLE_MESSAGE.to_string()
            }
        }
    }

    /// Sends the canned probe and reports whether the reply contains the
    /// expected acknowledgment (case-insensitive). False on any failure.
    async fn test_connection(&self) -> bool {
        match self
            .complete(
                &[ChatMessage::user(PROBE_MESSAGE)],
                CompletionParams::default(),
            )
            .await
        {
            Ok(reply) => reply.to_lowercase().contains(PROBE_ACK),
            Err(e) => {
                error!("Connection test failed: {e}");
                false
            }
        }
    }
}

/// Production backend over the xAI chat-completions endpoint.
///
/// The API key is read from the environment at startup and held in memory
/// only — it is never logged.
pub struct GrokClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f64,
    max_tokens: u32,
}

impl GrokClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_millis(config.grok_timeout_ms))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: config.grok_base_url.clone(),
            model: config.grok_model.clone(),
            api_key: config.xai_api_key.clone(),
            temperature: config.grok_temperature,
            max_tokens: config.grok_max_tokens,
        }
    }
}

#[async_trait]
impl CompletionBackend for GrokClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: CompletionParams,
    ) -> Result<String, CompletionError> {
        let (temperature, max_tokens) = params.resolve(self.temperature, self.max_tokens);
        let request_body = ChatCompletionRequest {
            messages,
            model: &self.model,
            temperature,
            max_tokens,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Completion call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(CompletionError::EmptyChoices)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Scripted backend for unit tests: pops canned outcomes in order, or
    /// fails with an API error once the script runs out.
    pub struct ScriptedBackend {
        replies: Mutex<Vec<Result<String, CompletionError>>>,
    }

    impl ScriptedBackend {
        pub fn new(replies: Vec<Result<String, CompletionError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
            }
        }

        pub fn replying(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }

        pub fn failing() -> Self {
            Self::new(vec![])
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _params: CompletionParams,
        ) -> Result<String, CompletionError> {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Err(CompletionError::Api {
                    status: 503,
                    message: "scripted failure".to_string(),
                });
            }
            replies.remove(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedBackend;
    use super::*;

    #[tokio::test]
    async fn test_connection_true_on_expected_ack() {
        let backend = ScriptedBackend::replying("Connection Successful! How can I help?");
        assert!(backend.test_connection().await);
    }

    #[tokio::test]
    async fn test_connection_is_case_insensitive() {
        let backend = ScriptedBackend::replying("CONNECTION SUCCESSFUL");
        assert!(backend.test_connection().await);
    }

    #[tokio::test]
    async fn test_connection_false_on_unrelated_reply() {
        let backend = ScriptedBackend::replying("Hello there!");
        assert!(!backend.test_connection().await);
    }

    #[tokio::test]
    async fn test_connection_false_on_failure() {
        let backend = ScriptedBackend::failing();
        assert!(!backend.test_connection().await);
    }

    #[tokio::test]
    async fn complete_or_unavailable_returns_sentinel_on_failure() {
        let backend = ScriptedBackend::failing();
        let reply = backend
            .complete_or_unavailable(&[ChatMessage::user("hi")], CompletionParams::default())
            .await;
        assert_eq!(reply, SERVICE_UNAVAILABLE_MESSAGE);
    }

    #[tokio::test]
    async fn complete_or_unavailable_passes_text_through() {
        let backend = ScriptedBackend::replying("fine");
        let reply = backend
            .complete_or_unavailable(&[ChatMessage::user("hi")], CompletionParams::default())
            .await;
        assert_eq!(reply, "fine");
    }

    fn make_config() -> Config {
        Config {
            database_url: "postgres://localhost/test".to_string(),
            xai_api_key: "test-key".to_string(),
            grok_base_url: "https://api.x.ai/v1".to_string(),
            grok_model: "grok-4".to_string(),
            grok_temperature: 0.2,
            grok_max_tokens: 512,
            grok_timeout_ms: 1000,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }

    #[test]
    fn grok_client_takes_model_params_from_config() {
        let client = GrokClient::new(&make_config());
        assert_eq!(client.temperature, 0.2);
        assert_eq!(client.max_tokens, 512);
    }

    #[test]
    fn default_params_resolve_to_configured_values() {
        let (temperature, max_tokens) = CompletionParams::default().resolve(0.2, 512);
        assert_eq!(temperature, 0.2);
        assert_eq!(max_tokens, 512);
    }

    #[test]
    fn with_temperature_overrides_only_the_temperature() {
        let (temperature, max_tokens) = CompletionParams::with_temperature(0.3).resolve(0.2, 512);
        assert_eq!(temperature, 0.3);
        assert_eq!(max_tokens, 512);
    }
}
