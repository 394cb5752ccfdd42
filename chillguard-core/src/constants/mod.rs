//! Constants for ChillGuard Core
//!
//! Centralized numeric policy for the analytics layer. Every value that
//! changes an observable KPI lives here with its unit in the name, so the
//! defaults in [`AnalyticsConfig`](crate::config::AnalyticsConfig) can be
//! traced back to one place.
//!
//! ## Organization
//!
//! - **Time**: unit conversions and default window lengths
//! - **Risk**: gap cap, exposure limit, inventory and price assumptions
//! - **Buffers**: telemetry buffer sizing

/// Time-related constants for unit conversion and window lengths.
pub mod time;

/// Risk, cost and reliability policy constants.
pub mod risk;

/// Telemetry buffer sizing.
pub mod buffers;

pub use time::{
    MS_PER_SECOND, MS_PER_MINUTE, MS_PER_HOUR,
    DEFAULT_REPORT_TIMEFRAME_MINUTES, DEFAULT_RATE_WINDOW_MINUTES,
};

pub use risk::{
    GAP_CAP_HOURS, CRITICAL_EXPOSURE_LIMIT_HOURS, ASSUMED_INVENTORY_KG,
    FALLBACK_PRICE_PER_KG, EXPECTED_SAMPLES_PER_MINUTE, MONTHLY_COST_RATIO,
};

pub use buffers::DEFAULT_MAX_ROWS;
