//! Telemetry Buffer Sizing
//!
//! The loader returns a buffer of the most recent readings; windowing happens
//! in the analytics layer. The buffer therefore has to be wider than any
//! analysis window it will be asked about.

use super::{risk::EXPECTED_SAMPLES_PER_MINUTE, time::DEFAULT_REPORT_TIMEFRAME_MINUTES};

/// Default number of most-recent readings fetched per sensor.
///
/// Sized to hold the default report timeframe at the nominal sampling rate:
/// 30 days × 1440 min × 12 samples/min = 518 400 rows.
pub const DEFAULT_MAX_ROWS: usize =
    DEFAULT_REPORT_TIMEFRAME_MINUTES as usize * EXPECTED_SAMPLES_PER_MINUTE as usize;

/// Smallest buffer accepted by configuration.
///
/// Two readings are the minimum for any interval or slope.
pub const MIN_MAX_ROWS: usize = 2;

/// Rows a sensor produces over `minutes` at `samples_per_minute`
pub const fn rows_for(minutes: u32, samples_per_minute: u32) -> u64 {
    minutes as u64 * samples_per_minute as u64
}
