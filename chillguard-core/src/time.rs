//! Time sources and anchoring for windowed analytics
//!
//! Every backward-looking window is measured from an *anchor* instant. Two
//! anchors are in use and they are intentionally not unified:
//!
//! - **Event time**: the newest timestamp in the fetched buffer. Used by the
//!   risk aggregator so delayed ingestion or historical replay still yields a
//!   full window.
//! - **Wall clock**: "now" from a [`TimeSource`]. Used for the warming trend
//!   and for uptime and alert counting.
//!
//! Unifying them changes observable results, so each calculator declares its
//! policy as an [`AnchorPolicy`] constant.

use crate::constants::time::{MS_PER_HOUR, MS_PER_MINUTE};

/// Timestamp in milliseconds since the Unix epoch
pub type Timestamp = u64;

/// Which instant a backward window is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AnchorPolicy {
    /// Newest reading in the fetched buffer
    EventTime,
    /// Current time from the injected clock
    WallClock,
}

/// Source of wall-clock time
pub trait TimeSource: Send + Sync {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

/// System time source (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Fixed time source for testing and replay
#[derive(Debug, Clone, Copy)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Move the clock to an absolute instant
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move the clock forward
    pub fn advance(&mut self, ms: u64) {
        self.timestamp = self.timestamp.saturating_add(ms);
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

/// Convert a window length in minutes to milliseconds
pub fn minutes_to_ms(minutes: u32) -> u64 {
    minutes as u64 * MS_PER_MINUTE
}

/// Elapsed milliseconds as fractional minutes
pub fn ms_to_minutes(ms: u64) -> f64 {
    ms as f64 / MS_PER_MINUTE as f64
}

/// Elapsed milliseconds as fractional hours
pub fn ms_to_hours(ms: u64) -> f64 {
    ms as f64 / MS_PER_HOUR as f64
}

/// Start of a backward window of `minutes` ending at `anchor`
///
/// Saturates at the epoch rather than wrapping.
pub fn window_start(anchor: Timestamp, minutes: u32) -> Timestamp {
    anchor.saturating_sub(minutes_to_ms(minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_time_advances() {
        let mut time = FixedTime::new(1000);
        assert_eq!(time.now(), 1000);

        time.advance(500);
        assert_eq!(time.now(), 1500);

        time.set(10);
        assert_eq!(time.now(), 10);
    }

    #[test]
    fn conversions() {
        assert_eq!(minutes_to_ms(5), 300_000);
        assert_eq!(ms_to_minutes(300_000), 5.0);
        assert_eq!(ms_to_hours(600_000), 10.0 / 60.0);
    }

    #[test]
    fn window_start_saturates() {
        assert_eq!(window_start(600_000, 5), 300_000);
        assert_eq!(window_start(1_000, 5), 0);
    }

    #[cfg(feature = "std")]
    #[test]
    fn system_time_after_fixture_epoch() {
        // 2024-12-11T22:30:00Z
        assert!(SystemTime.now() > 1_733_956_200_000);
    }
}
