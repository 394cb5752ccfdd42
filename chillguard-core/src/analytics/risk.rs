//! Gap-bounded risk-exposure aggregation
//!
//! Accumulates the time a chamber spent above its threshold inside a
//! backward window, over irregular sampling.
//!
//! ## Algorithm
//!
//! 1. Anchor at the newest timestamp in the **whole** fetched buffer (event
//!    time, not "now"), so delayed ingestion and replayed history still see
//!    a full window.
//! 2. Keep readings with `timestamp >= anchor - timeframe`.
//! 3. Each reading except the last opens an interval that ends at its
//!    successor and carries the reading's temperature forward.
//! 4. An interval is critical when its opening temperature exceeds its
//!    threshold **and** it is shorter than the gap cap.
//! 5. Exposure is the sum of critical durations.
//!
//! The last reading in the analysis window has no successor and therefore
//! no interval. It never contributes exposure.
//!
//! ## Why a gap cap?
//!
//! A sensor that drops offline for an hour while reading 9 °C would
//! otherwise book a full hour of danger on the strength of one sample.
//! Intervals at or above the cap are counted as outages instead.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::{
    time::{ms_to_hours, window_start, AnchorPolicy, Timestamp},
    window::{Reading, Window},
};

/// Anchor used by [`hours_at_risk`]
pub const RISK_ANCHOR: AnchorPolicy = AnchorPolicy::EventTime;

/// Half-open interval `[start, end)` between two consecutive readings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskInterval {
    /// Timestamp of the opening reading
    pub start: Timestamp,
    /// Timestamp of the next reading
    pub end: Timestamp,
    /// Interval length in hours
    pub duration_hours: f64,
    /// Temperature sampled at `start`
    pub temperature: f64,
    /// Threshold in force at `start`
    pub threshold: f64,
    /// Above threshold and shorter than the gap cap
    pub is_critical: bool,
}

impl RiskInterval {
    fn between(current: &Reading, next: &Reading, gap_cap_hours: f64) -> Self {
        let duration_hours = ms_to_hours(next.timestamp.saturating_sub(current.timestamp));
        Self {
            start: current.timestamp,
            end: next.timestamp,
            duration_hours,
            temperature: current.temperature,
            threshold: current.threshold,
            is_critical: current.exceeds_threshold() && duration_hours < gap_cap_hours,
        }
    }

    /// Interval skipped as a sensor outage
    pub fn is_outage(&self, gap_cap_hours: f64) -> bool {
        self.duration_hours >= gap_cap_hours
    }
}

/// Hours above threshold in the last `timeframe_minutes` before the newest
/// reading
pub fn hours_at_risk(window: &Window, timeframe_minutes: u32, gap_cap_hours: f64) -> f64 {
    analysis_window(window, timeframe_minutes)
        .windows(2)
        .map(|pair| RiskInterval::between(&pair[0], &pair[1], gap_cap_hours))
        .filter(|interval| interval.is_critical)
        .map(|interval| interval.duration_hours)
        .sum()
}

/// Every interval of the analysis window, critical or not
pub fn risk_intervals(window: &Window, timeframe_minutes: u32, gap_cap_hours: f64) -> Vec<RiskInterval> {
    analysis_window(window, timeframe_minutes)
        .windows(2)
        .map(|pair| RiskInterval::between(&pair[0], &pair[1], gap_cap_hours))
        .collect()
}

fn analysis_window(window: &Window, timeframe_minutes: u32) -> &[Reading] {
    match window.anchor() {
        Some(anchor) => window.since(window_start(anchor, timeframe_minutes)),
        None => &[],
    }
}
