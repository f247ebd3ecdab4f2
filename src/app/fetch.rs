// src/app/fetch.rs — the one HTTP call this app makes
use std::time::Duration;

use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde_json::Value;
use tracing::{debug, error};

use super::error::ScheduleError;
use crate::config::AppConfig;

/// Anything that can hand back the raw schedule payload. Called off the UI thread.
pub trait ScheduleSource: Send + Sync {
    fn fetch(&self) -> Result<Value, ScheduleError>;
}

pub struct HttpScheduleSource {
    client: Client,
    url: String,
}

/// Builder carrying the fixed headers and timeout. Certificates are not verified.
pub fn client_builder(cfg: &AppConfig) -> Result<ClientBuilder, ScheduleError> {
    let mut headers = HeaderMap::new();
    let ua = HeaderValue::from_str(&cfg.user_agent)
        .map_err(|e| ScheduleError::Network(format!("bad user agent: {e}")))?;
    headers.insert(USER_AGENT, ua);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Ok(Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(cfg.request_timeout_secs))
        .danger_accept_invalid_certs(true))
}

pub fn build_client(cfg: &AppConfig) -> Result<Client, ScheduleError> {
    client_builder(cfg)?
        .build()
        .map_err(|e| ScheduleError::Network(format!("http client: {e}")))
}

impl HttpScheduleSource {
    pub fn new(cfg: &AppConfig) -> Result<Self, ScheduleError> {
        Ok(Self::with_client(build_client(cfg)?, cfg.api_url.clone()))
    }

    /// Reuse a prepared client, e.g. one without proxy lookup.
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ScheduleSource for HttpScheduleSource {
    fn fetch(&self) -> Result<Value, ScheduleError> {
        fetch_json(&self.client, &self.url).map_err(|e| {
            error!("schedule fetch from {} failed: {e}", self.url);
            e
        })
    }
}

/// GET `url` and parse the body as JSON. Non-2xx is a network error.
pub fn fetch_json(client: &Client, url: &str) -> Result<Value, ScheduleError> {
    let resp = client
        .get(url)
        .send()
        .map_err(|e| ScheduleError::Network(format!("GET {url}: {e}")))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ScheduleError::Network(format!("HTTP {status} for {url}")));
    }
    let body = resp
        .text()
        .map_err(|e| ScheduleError::Network(format!("read body: {e}")))?;
    debug!("fetched {} bytes from {url}", body.len());

    serde_json::from_str(&body).map_err(|e| ScheduleError::Parse(format!("invalid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unusable_user_agent_is_rejected() {
        let cfg = AppConfig {
            user_agent: "bad\nagent".into(),
            ..AppConfig::default()
        };
        assert!(matches!(build_client(&cfg), Err(ScheduleError::Network(_))));
        assert!(build_client(&AppConfig::default()).is_ok());
    }
}
