//! HTTP Collaborators for the Monitoring Backend API
//!
//! ## Overview
//!
//! Telemetry and alerts live behind the backend's REST API. This module
//! provides a small JSON client and the two collaborators built on it:
//!
//! | Collaborator            | Routes                                                     |
//! |-------------------------|------------------------------------------------------------|
//! | [`HttpTelemetryReader`] | `GET /api/readings/{id}?limit=N`, `GET /api/chambers/{id}` |
//! | [`HttpAlertStore`]      | `GET /api/alerts?limit=N`                                  |
//!
//! ## Wire Quirks
//!
//! - Readings come back **newest first** and without thresholds; the reader
//!   joins the chamber's `warning_threshold` and reorders.
//! - An empty result set is encoded as JSON `null`, not `[]`.
//! - Timestamps are RFC 3339 strings with an offset.
//! - The per-chamber alert route is capped at the 50 newest alerts. The
//!   store scans the global route instead and filters by `sensor_id`; a scan
//!   that fills its limit without reaching `since` is logged as a lower bound.
//!
//! ## Implementation Choices
//!
//! - `ureq` is blocking, so every request runs on tokio's blocking pool.
//! - Transport errors, 5xx and 429 are retried with exponential backoff;
//!   other statuses fail immediately.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chillguard_connectors::http::{HttpClient, HttpConfig, HttpTelemetryReader};
//! use chillguard_connectors::TelemetryReader;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpConfig::new("http://localhost:8080")
//!     .timeout_secs(5)
//!     .max_retries(2);
//!
//! let client = Arc::new(HttpClient::new(config)?);
//! let reader = HttpTelemetryReader::new(client);
//! let window = reader.fetch("CF-1", 2000).await?;
//! println!("{} readings", window.len());
//! # Ok(())
//! # }
//! ```

use crate::{AlertStore, ConnectionStats, ConnectorError, TelemetryReader};
use chillguard_core::{Reading, Timestamp, Window};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Base URL when `CHILLGUARD_API_URL` is unset
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Newest alerts fetched per count
pub const DEFAULT_ALERT_SCAN_LIMIT: usize = 10_000;

/// HTTP-specific errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(String),

    /// Server returned error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<HttpError> for ConnectorError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Request(msg) => ConnectorError::Unavailable(msg),
            HttpError::ServerError { status, message } => {
                ConnectorError::Unavailable(format!("HTTP {status}: {message}"))
            }
            HttpError::Serialization(msg) => ConnectorError::Malformed(msg),
            HttpError::Config(msg) => ConnectorError::ConfigError(msg),
        }
    }
}

/// HTTP configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Custom headers
    pub headers: HashMap<String, String>,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// User agent string
    pub user_agent: String,
}

impl HttpConfig {
    /// Create new configuration with base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            headers: HashMap::new(),
            max_retries: 3,
            user_agent: format!("ChillGuard/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Configuration from `CHILLGUARD_API_URL`, `CHILLGUARD_API_TIMEOUT_SECS`
    /// and `CHILLGUARD_API_RETRIES`
    ///
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("CHILLGUARD_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(base_url);

        if let Some(secs) = env_parse::<u64>("CHILLGUARD_API_TIMEOUT_SECS") {
            config = config.timeout_secs(secs);
        }
        if let Some(retries) = env_parse::<u32>("CHILLGUARD_API_RETRIES") {
            config = config.max_retries(retries);
        }

        config
    }

    /// Set request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Set retry budget for transport and 5xx errors
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Add custom header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|value| value.trim().parse().ok())
}

/// Outcome of one blocking request attempt
enum Attempt {
    Body(String),
    Status(u16, String),
    Transport(String),
}

/// JSON-over-HTTP client using the lightweight ureq agent
pub struct HttpClient {
    config: HttpConfig,
    agent: ureq::Agent,
    stats: Arc<Mutex<ConnectionStats>>,
}

impl HttpClient {
    /// Create new HTTP client
    pub fn new(config: HttpConfig) -> Result<Self, HttpError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(HttpError::Config("Base URL must start with http:// or https://".into()));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();

        Ok(Self {
            config,
            agent,
            stats: Arc::new(Mutex::new(ConnectionStats::default())),
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Snapshot of request statistics
    pub fn stats(&self) -> ConnectionStats {
        self.lock_stats().clone()
    }

    /// GET `path` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, HttpError> {
        let url = self.url(path);
        let body = self.execute_with_retry(&url, query).await?;

        serde_json::from_str(&body).map_err(|e| HttpError::Serialization(e.to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Build request with headers and query parameters
    fn build_request(&self, url: &str, query: &[(&str, String)]) -> ureq::Request {
        let mut request = self.agent.get(url);

        for (name, value) in query {
            request = request.query(name, value);
        }

        for (name, value) in &self.config.headers {
            request = request.set(name, value);
        }

        request.set("Accept", "application/json")
    }

    /// Execute request with retry logic
    async fn execute_with_retry(&self, url: &str, query: &[(&str, String)]) -> Result<String, HttpError> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                // Exponential backoff
                let delay = Duration::from_millis(100 * (1u64 << attempt.min(6)));
                log::debug!("retrying {} in {:?} (attempt {})", url, delay, attempt);
                self.lock_stats().retries += 1;
                tokio::time::sleep(delay).await;
            }

            let request = self.build_request(url, query);
            let outcome = tokio::task::spawn_blocking(move || match request.call() {
                Ok(resp) => match resp.into_string() {
                    Ok(body) => Attempt::Body(body),
                    Err(e) => Attempt::Transport(e.to_string()),
                },
                Err(ureq::Error::Status(code, resp)) => {
                    Attempt::Status(code, resp.into_string().unwrap_or_default())
                }
                Err(ureq::Error::Transport(e)) => Attempt::Transport(e.to_string()),
            })
            .await
            .map_err(|e| HttpError::Request(e.to_string()))?;

            match outcome {
                Attempt::Body(body) => {
                    let mut stats = self.lock_stats();
                    stats.requests_ok += 1;
                    stats.bytes_received += body.len() as u64;
                    return Ok(body);
                }
                Attempt::Status(status, message) if status >= 500 || status == 429 => {
                    // Server error or rate limit - retry
                    last_error = Some(HttpError::ServerError { status, message });
                }
                Attempt::Status(status, message) => {
                    // Client error - don't retry
                    return Err(self.fail(HttpError::ServerError { status, message }));
                }
                Attempt::Transport(message) => {
                    // Network error - retry
                    last_error = Some(HttpError::Request(message));
                }
            }
        }

        // All retries exhausted
        let err = last_error.unwrap_or_else(|| HttpError::Request("Unknown error".into()));
        Err(self.fail(err))
    }

    fn fail(&self, err: HttpError) -> HttpError {
        log::warn!("request to {} failed: {}", self.config.base_url, err);
        let mut stats = self.lock_stats();
        stats.requests_failed += 1;
        stats.last_error = Some(err.to_string());
        err
    }

    fn lock_stats(&self) -> std::sync::MutexGuard<'_, ConnectionStats> {
        self.stats.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Chamber as returned by `GET /api/chambers/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct ChamberRecord {
    pub id: String,
    pub warning_threshold: f64,
    #[serde(default)]
    pub critical_threshold: Option<f64>,
}

/// Reading as returned by `GET /api/readings/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct ReadingRecord {
    pub sensor_id: String,
    pub temperature: f64,
    pub timestamp: DateTime<Utc>,
}

/// Alert as returned by `GET /api/alerts`
#[derive(Debug, Clone, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    pub sensor_id: String,
    pub timestamp: DateTime<Utc>,
}

fn to_timestamp(instant: &DateTime<Utc>) -> Result<Timestamp, ConnectorError> {
    Timestamp::try_from(instant.timestamp_millis())
        .map_err(|_| ConnectorError::Malformed(format!("timestamp {instant} precedes the epoch")))
}

/// Join readings with the chamber threshold and order them oldest first
///
/// Keeps the `max_rows` most recent readings.
pub fn decode_window(
    records: Vec<ReadingRecord>,
    threshold: f64,
    max_rows: usize,
) -> Result<Window, ConnectorError> {
    let mut readings = records
        .iter()
        .map(|record| Ok(Reading::new(to_timestamp(&record.timestamp)?, record.temperature, threshold)))
        .collect::<Result<Vec<_>, ConnectorError>>()?;

    readings.sort_by_key(|reading| reading.timestamp);
    if readings.len() > max_rows {
        readings.drain(..readings.len() - max_rows);
    }

    Window::new(readings).map_err(|e| ConnectorError::Malformed(e.to_string()))
}

/// Alerts raised by `sensor_id` at or after `since`
pub fn count_alerts_since(
    records: &[AlertRecord],
    sensor_id: &str,
    since: Timestamp,
) -> Result<u32, ConnectorError> {
    let mut count = 0u32;
    for record in records.iter().filter(|r| r.sensor_id == sensor_id) {
        if to_timestamp(&record.timestamp)? >= since {
            count = count.saturating_add(1);
        }
    }
    Ok(count)
}

/// Whether a full scan may have stopped short of `since`
fn scan_saturated(records: &[AlertRecord], limit: usize, since: Timestamp) -> bool {
    records.len() >= limit
        && records
            .iter()
            .filter_map(|r| to_timestamp(&r.timestamp).ok())
            .min()
            .is_some_and(|oldest| oldest >= since)
}

/// Telemetry from the readings and chambers routes
pub struct HttpTelemetryReader {
    client: Arc<HttpClient>,
}

impl HttpTelemetryReader {
    /// Reader sharing `client`
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl TelemetryReader for HttpTelemetryReader {
    async fn fetch(&self, sensor_id: &str, max_rows: usize) -> Result<Window, ConnectorError> {
        let readings_path = format!("/api/readings/{sensor_id}");
        let records: Option<Vec<ReadingRecord>> = self
            .client
            .get_json(&readings_path, &[("limit", max_rows.to_string())])
            .await?;

        let records = records.unwrap_or_default();
        if records.is_empty() {
            return Ok(Window::empty());
        }

        let chamber_path = format!("/api/chambers/{sensor_id}");
        let chamber: ChamberRecord = self.client.get_json(&chamber_path, &[]).await?;

        decode_window(records, chamber.warning_threshold, max_rows)
    }
}

/// Alert counts from the global alerts route
pub struct HttpAlertStore {
    client: Arc<HttpClient>,
    scan_limit: usize,
}

impl HttpAlertStore {
    /// Store sharing `client`
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client, scan_limit: DEFAULT_ALERT_SCAN_LIMIT }
    }

    /// Override how many of the newest alerts one count scans
    pub fn with_scan_limit(mut self, limit: usize) -> Self {
        self.scan_limit = limit.max(1);
        self
    }
}

#[async_trait::async_trait]
impl AlertStore for HttpAlertStore {
    async fn count_alerts(&self, sensor_id: &str, since: Timestamp) -> Result<u32, ConnectorError> {
        let records: Option<Vec<AlertRecord>> = self
            .client
            .get_json("/api/alerts", &[("limit", self.scan_limit.to_string())])
            .await?;
        let records = records.unwrap_or_default();

        if scan_saturated(&records, self.scan_limit, since) {
            log::warn!(
                "alert scan of {} records did not reach the window start; count for {} is a lower bound",
                self.scan_limit,
                sensor_id
            );
        }

        count_alerts_since(&records, sensor_id, since)
    }
}
