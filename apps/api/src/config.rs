use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
///
/// The completion-endpoint defaults mirror the xAI chat-completions API:
/// `grok-4` at 1000 max tokens with a 30s hard timeout per call.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub xai_api_key: String,
    pub grok_base_url: String,
    pub grok_model: String,
    pub grok_temperature: f64,
    pub grok_max_tokens: u32,
    pub grok_timeout_ms: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            xai_api_key: require_env("XAI_API_KEY")?,
            grok_base_url: optional_env("GROK_BASE_URL", "https://api.x.ai/v1"),
            grok_model: optional_env("GROK_MODEL", "grok-4"),
            grok_temperature: optional_env("GROK_TEMPERATURE", "0.7")
                .parse::<f64>()
                .context("GROK_TEMPERATURE must be a number")?,
            grok_max_tokens: optional_env("GROK_MAX_TOKENS", "1000")
                .parse::<u32>()
                .context("GROK_MAX_TOKENS must be a positive integer")?,
            grok_timeout_ms: optional_env("GROK_TIMEOUT_MS", "30000")
                .parse::<u64>()
                .context("GROK_TIMEOUT_MS must be a positive integer")?,
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
