use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::BackendTimeouts;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub ollama_host: String,
    /// Preferred model identifier; the probe falls back to any listed model.
    pub ollama_model: String,
    pub port: u16,
    pub rust_log: String,
    pub timeouts: BackendTimeouts,
    /// Max documents processed in parallel by the batch endpoint.
    pub batch_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            ollama_host: std::env::var("OLLAMA_HOST")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.1".to_string()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            timeouts: BackendTimeouts {
                liveness: Duration::from_secs(parse_env("PROBE_TIMEOUT_SECS", 5)?),
                classification: Duration::from_secs(parse_env("CLASSIFY_TIMEOUT_SECS", 300)?),
                experience: Duration::from_secs(parse_env("EXPERIENCE_TIMEOUT_SECS", 1200)?),
                generation: Duration::from_secs(parse_env("GENERATION_TIMEOUT_SECS", 3600)?),
            },
            batch_concurrency: parse_env::<usize>("BATCH_CONCURRENCY", 4)?.max(1),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
