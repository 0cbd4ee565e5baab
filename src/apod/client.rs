//! HTTP client and response classification for the APOD service.

use anyhow::Result;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tokio::time::Duration;
use tracing::{debug, warn};

use super::types::{ApodError, ApodRecord, APOD_ENDPOINT};
use crate::TARGET_WEB_REQUEST;

/// Query parameters for one APOD request. `date` is omitted entirely
/// when unset, which the service reads as "today".
#[derive(Debug, Serialize)]
struct ApodQuery<'a> {
    api_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<&'a str>,
    hd: bool,
}

/// Client for the APOD metadata endpoint. Built once at startup and
/// handed down; the base URL is injectable so tests can stand in a
/// local server.
#[derive(Debug, Clone)]
pub struct ApodClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ApodClient {
    /// Create a client against the NASA endpoint
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, APOD_ENDPOINT)
    }

    /// Create a client against an alternate endpoint
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .gzip(true)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(ApodClient {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    /// Fetch one APOD record.
    ///
    /// Classification is ordered: transport failures first, then
    /// non-success statuses, then JSON-embedded API errors, then the
    /// image/other media split. Every failure comes back as an
    /// [`ApodError`] value; nothing is raised as a hard error.
    pub async fn fetch(
        &self,
        date: Option<&str>,
        hd: bool,
        timeout: Duration,
    ) -> Result<ApodRecord, ApodError> {
        let query = ApodQuery {
            api_key: &self.api_key,
            date,
            hd,
        };

        debug!(
            target: TARGET_WEB_REQUEST,
            "Requesting APOD from {} (date: {:?}, hd: {})", self.base_url, date, hd
        );

        let response = match self
            .http
            .get(&self.base_url)
            .query(&query)
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(target: TARGET_WEB_REQUEST, "APOD request failed: {}", e);
                return Err(ApodError::Network(e.to_string()));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(target: TARGET_WEB_REQUEST, "Failed to read APOD response body: {}", e);
                return Err(ApodError::Network(e.to_string()));
            }
        };

        debug!(target: TARGET_WEB_REQUEST, "APOD responded with status {}", status);
        classify_response(status, &body, hd)
    }
}

/// Ordered classification of one APOD response, pure so the rules are
/// testable without a network.
fn classify_response(status: StatusCode, body: &str, hd: bool) -> Result<ApodRecord, ApodError> {
    if !status.is_success() {
        // Prefer the service's nested error message; fall back to the
        // whole JSON body, then to the raw text.
        let message = match serde_json::from_str::<Value>(body) {
            Ok(err) => err
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string()),
            Err(_) => body.to_string(),
        };
        return Err(ApodError::Http {
            status: status.as_u16(),
            message,
        });
    }

    let data: Value = match serde_json::from_str(body) {
        Ok(data) => data,
        Err(e) => return Err(ApodError::Network(e.to_string())),
    };

    if let Some(error) = data.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown API error")
            .to_string();
        return Err(ApodError::Api(message));
    }

    Ok(ApodRecord::from_json(&data, hd))
}
