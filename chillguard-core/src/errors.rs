//! Error Types for Telemetry Windows and Analytics Configuration
//!
//! ## Design Philosophy
//!
//! Most analytics "failures" are not errors at all. A window with zero or one
//! reading, or with zero elapsed time, produces a well-defined numeric floor
//! of `0.0`. A missing market price produces a tagged fallback
//! ([`PriceSource::Fallback`](crate::analytics::cost::PriceSource)). What is
//! left for this module is the small set of conditions that mean the caller
//! handed us something we cannot reason about:
//!
//! 1. **Malformed windows**: readings out of timestamp order, or non-finite
//!    temperatures/thresholds.
//! 2. **Invalid configuration**: a zero gap cap, a non-positive exposure limit.
//! 3. **Inconsistent reports**: a rounded KPI that escaped its valid range.
//!
//! Errors stay `Copy` and carry only `&'static str` context so they can be
//! returned from `no_std` builds without allocation.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use chillguard_core::{Reading, Window, WindowError};
//!
//! let readings = vec![
//!     Reading::new(2_000, 4.0, 8.0),
//!     Reading::new(1_000, 4.1, 8.0),
//! ];
//!
//! match Window::new(readings) {
//!     Ok(_) => {}
//!     Err(WindowError::OutOfOrder { index }) => {
//!         // Upstream returned newest-first; sort or reject
//!         assert_eq!(index, 1);
//!     }
//!     Err(_) => {}
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for analytics operations
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Problems detected while building a [`Window`](crate::window::Window)
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum WindowError {
    /// Reading timestamp is earlier than its predecessor
    #[error("Reading {index} is older than the reading before it")]
    OutOfOrder {
        /// Position of the offending reading
        index: usize,
    },

    /// Temperature or threshold is NaN or infinite
    #[error("Reading {index} has a non-finite temperature or threshold")]
    InvalidValue {
        /// Position of the offending reading
        index: usize,
    },
}

/// Configuration and report-assembly errors
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum AnalyticsError {
    /// A configuration parameter is outside its meaningful range
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Which constraint was violated
        reason: &'static str,
    },

    /// A KPI field failed the post-rounding consistency check
    #[error("Inconsistent report field {field}: {reason}")]
    InconsistentReport {
        /// Report field name as serialized
        field: &'static str,
        /// Which check failed
        reason: &'static str,
    },

    /// The fetched buffer is full and still starts inside the analysis
    /// window, so older readings were cut off
    #[error("Telemetry buffer of {rows} rows does not cover {timeframe_minutes} minutes")]
    TruncatedWindow {
        /// Readings in the buffer, equal to the row limit
        rows: usize,
        /// Window the report was asked to cover
        timeframe_minutes: u32,
    },

    /// Window could not be constructed
    #[error("Invalid window: {0}")]
    Window(#[from] WindowError),
}

#[cfg(feature = "defmt")]
impl defmt::Format for WindowError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::OutOfOrder { index } =>
                defmt::write!(fmt, "Reading {} out of order", index),
            Self::InvalidValue { index } =>
                defmt::write!(fmt, "Reading {} not finite", index),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AnalyticsError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidConfig { reason } =>
                defmt::write!(fmt, "Invalid config: {}", reason),
            Self::InconsistentReport { field, reason } =>
                defmt::write!(fmt, "Inconsistent {}: {}", field, reason),
            Self::TruncatedWindow { rows, timeframe_minutes } =>
                defmt::write!(fmt, "Buffer of {} rows short of {} min", rows, timeframe_minutes),
            Self::Window(e) =>
                defmt::write!(fmt, "Invalid window: {}", e),
        }
    }
}
