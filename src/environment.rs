use std::env;
use tokio::time::Duration;

use crate::apod::{APOD_ENDPOINT, DEMO_KEY, REQUEST_TIMEOUT};
use crate::llm::DEFAULT_MODEL;

/// Configuration read once at process start. Clients are built from it
/// in main and handed down; nothing re-reads the environment afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// NASA API key; the public rate-limited demo key when unset
    pub nasa_api_key: String,
    /// APOD endpoint, overridable so a stand-in server can be used
    pub apod_base_url: String,
    /// Completion credential. Left optional: when unset the completion
    /// client falls back to its own environment lookup and fails at
    /// call time.
    pub openai_api_key: Option<String>,
    /// Completion model name
    pub model: String,
    /// Sampling temperature; unset means the service default
    pub temperature: Option<f32>,
    /// Per-request budget applied to both outbound calls
    pub request_timeout: Duration,
    /// Port the web UI listens on
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            nasa_api_key: env::var("NASA_API_KEY").unwrap_or_else(|_| DEMO_KEY.to_string()),
            apod_base_url: env::var("APOD_BASE_URL")
                .unwrap_or_else(|_| APOD_ENDPOINT.to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            temperature: env::var("LLM_TEMPERATURE").ok().and_then(|t| t.parse().ok()),
            request_timeout: env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|t| t.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(REQUEST_TIMEOUT),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        }
    }
}
