//! Time-Related Constants
//!
//! This module defines conversion factors and default window lengths
//! used by the analytics calculators.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: u64 = 60;

/// Minutes per hour.
pub const MINUTES_PER_HOUR: u64 = 60;

/// Hours per day.
pub const HOURS_PER_DAY: u64 = 24;

/// Milliseconds per minute.
pub const MS_PER_MINUTE: u64 = MS_PER_SECOND * SECONDS_PER_MINUTE;

/// Milliseconds per hour.
pub const MS_PER_HOUR: u64 = MS_PER_MINUTE * MINUTES_PER_HOUR;

/// Minutes per day.
pub const MINUTES_PER_DAY: u32 = (MINUTES_PER_HOUR * HOURS_PER_DAY) as u32;

// ===== ANALYSIS WINDOWS =====

/// Default KPI report timeframe (minutes).
///
/// Thirty days, the horizon the reporting surface asks for when it
/// does not specify one.
pub const DEFAULT_REPORT_TIMEFRAME_MINUTES: u32 = 30 * MINUTES_PER_DAY;

/// Default rate-of-change window (minutes).
///
/// The trend shown next to a chamber is the last half hour, independent
/// of the report timeframe.
pub const DEFAULT_RATE_WINDOW_MINUTES: u32 = 30;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_are_consistent() {
        assert_eq!(MS_PER_MINUTE, 60_000);
        assert_eq!(MS_PER_HOUR, 3_600_000);
        assert_eq!(DEFAULT_REPORT_TIMEFRAME_MINUTES, 43_200);
    }
}
