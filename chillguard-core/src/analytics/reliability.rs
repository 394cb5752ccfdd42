//! Sampling reliability (uptime)
//!
//! Ratio of samples actually received to samples a healthy sensor would have
//! delivered, as a percentage clamped to 100.
//!
//! Samples are counted against the **wall clock** (`now - timeframe`), not
//! against the newest reading. A sensor that went silent an hour ago
//! therefore loses uptime even though its last buffer looks dense. The risk
//! aggregator uses event time; the two anchors are kept apart on purpose.

use crate::{
    constants::risk::{MAX_UPTIME_PERCENT, MONEY_DECIMALS},
    time::{window_start, AnchorPolicy, Timestamp},
    traits::RoundTo,
    window::Window,
};

/// Anchor used when counting samples for [`uptime`]
pub const UPTIME_ANCHOR: AnchorPolicy = AnchorPolicy::WallClock;

/// Readings received in the last `timeframe_minutes` before `now`
pub fn count_since(window: &Window, now: Timestamp, timeframe_minutes: u32) -> usize {
    window.count_since(window_start(now, timeframe_minutes))
}

/// Uptime percentage, two decimals, never above 100
///
/// Returns `0.0` when no samples are expected.
pub fn uptime(actual: usize, timeframe_minutes: u32, expected_samples_per_minute: u32) -> f64 {
    let expected = timeframe_minutes as u64 * expected_samples_per_minute as u64;
    if expected == 0 {
        return 0.0;
    }

    let percent = actual as f64 / expected as f64 * 100.0;
    percent.min(MAX_UPTIME_PERCENT).round_to(MONEY_DECIMALS)
}
