//! Collaborator Connectors and the KPI Service
//!
//! ## Overview
//!
//! The analytics in `chillguard-core` are pure: they take a fetched window,
//! an alert count and a price, and return numbers. This crate supplies the
//! fetching. It defines the three collaborator interfaces the report
//! depends on, ships implementations of them, and runs the fetches
//! concurrently in [`service::KpiService`].
//!
//! ## Collaborators
//!
//! ### Telemetry ([`TelemetryReader`])
//!
//! Returns up to `max_rows` most recent readings for a sensor, oldest first,
//! each annotated with the chamber's warning threshold. A sensor with no
//! data yields an empty window, never an error. A failed fetch is an error:
//! it signals an outage upstream, not an idle chamber.
//!
//! ### Alerts ([`AlertStore`])
//!
//! Counts alert events for a sensor since a wall-clock instant.
//!
//! ### Market prices ([`MarketPriceFeed`])
//!
//! Average price per kilogram across the scraper's periodically regenerated
//! record set. Infallible by contract: a missing or malformed record set
//! yields [`PriceSource::Fallback`], which travels with the report so
//! consumers can tell a degraded estimate from a live one.
//!
//! ## Failure Policy
//!
//! | Collaborator | On failure                         |
//! |--------------|------------------------------------|
//! | Telemetry    | report fails (`ServiceError`)      |
//! | Alerts       | report fails (`ServiceError`)      |
//! | Prices       | fallback price, report degraded    |
//!
//! Each fetch is bounded by a timeout. The service does not retry; the HTTP
//! client has its own retry budget for transport errors.
//!
//! ## Implementations
//!
//! | Module     | Telemetry | Alerts | Prices |
//! |------------|-----------|--------|--------|
//! | [`http`]   | ✓         | ✓      |        |
//! | [`price`]  |           |        | ✓ (file, static) |
//! | [`memory`] | ✓         | ✓      |        |
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chillguard_connectors::{
//!     http::{HttpAlertStore, HttpClient, HttpConfig, HttpTelemetryReader},
//!     price::FilePriceFeed,
//!     service::{KpiService, ServiceConfig},
//! };
//! use chillguard_core::SystemTime;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(HttpClient::new(HttpConfig::from_env())?);
//!
//! let service = KpiService::new(
//!     Arc::new(HttpTelemetryReader::new(client.clone())),
//!     Arc::new(HttpAlertStore::new(client)),
//!     Arc::new(FilePriceFeed::new("datos/precios_mercado.csv")),
//!     Arc::new(SystemTime),
//!     ServiceConfig::default(),
//! );
//!
//! let report = service.report("CF-1", None).await?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "http")]
pub mod http;

pub mod memory;
pub mod price;
pub mod service;

pub use chillguard_core::{PriceSource, Timestamp, Window};
pub use service::{KpiService, ServiceConfig, ServiceError};

use thiserror::Error;

/// Common collaborator errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    #[error("Timeout")]
    Timeout,

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Source of telemetry windows
#[async_trait::async_trait]
pub trait TelemetryReader: Send + Sync {
    /// Up to `max_rows` most recent readings for `sensor_id`, oldest first
    async fn fetch(&self, sensor_id: &str, max_rows: usize) -> Result<Window, ConnectorError>;
}

/// Source of alert counts
#[async_trait::async_trait]
pub trait AlertStore: Send + Sync {
    /// Alert events for `sensor_id` at or after `since`
    async fn count_alerts(&self, sensor_id: &str, since: Timestamp) -> Result<u32, ConnectorError>;
}

/// Source of the market price signal
#[async_trait::async_trait]
pub trait MarketPriceFeed: Send + Sync {
    /// Average price per kilogram, or the tagged fallback
    async fn average_price_per_kg(&self) -> PriceSource;
}

/// Connection statistics common to network collaborators
#[derive(Debug, Default, Clone)]
pub struct ConnectionStats {
    /// Requests that returned a usable response
    pub requests_ok: u64,
    /// Requests that failed after all retries
    pub requests_failed: u64,
    /// Retries performed
    pub retries: u64,
    /// Response bytes received
    pub bytes_received: u64,
    /// Last error message
    pub last_error: Option<String>,
}
