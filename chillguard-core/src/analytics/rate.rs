//! Rate-of-change estimation
//!
//! Signed slope in °C per minute between the first and last reading of a
//! backward window. Positive means the chamber is warming.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::{
    constants::risk::RATE_DECIMALS,
    time::{ms_to_minutes, window_start, AnchorPolicy, Timestamp},
    traits::RoundTo,
    window::{Reading, Window},
};

/// Anchor the report applies: a sensor that stopped reporting has no trend
pub const RATE_ANCHOR: AnchorPolicy = AnchorPolicy::WallClock;

/// Slope over the last `timeframe_minutes` of the window, anchored at its
/// newest reading
///
/// For replaying a captured buffer. Live reports go through
/// [`rate_of_change_at`] with the wall clock.
pub fn rate_of_change(window: &Window, timeframe_minutes: u32) -> f64 {
    match window.anchor() {
        Some(anchor) => rate_of_change_at(window, timeframe_minutes, anchor),
        None => 0.0,
    }
}

/// Slope over readings with `timestamp >= anchor - timeframe_minutes`
///
/// Readings newer than `anchor` are still included; the anchor only sets the
/// cutoff. Returns `0.0` for fewer than two readings or zero elapsed time.
pub fn rate_of_change_at(window: &Window, timeframe_minutes: u32, anchor: Timestamp) -> f64 {
    let subset = window.since(window_start(anchor, timeframe_minutes));
    slope(subset)
}

/// Per-pair rates for consecutive readings, in °C per minute
///
/// One entry per reading after the first. A pair sharing a timestamp yields
/// `0.0`.
pub fn instant_rates(window: &Window) -> Vec<f64> {
    window
        .readings()
        .windows(2)
        .map(slope)
        .collect()
}

fn slope(readings: &[Reading]) -> f64 {
    let (first, last) = match (readings.first(), readings.last()) {
        (Some(first), Some(last)) if readings.len() >= 2 => (first, last),
        _ => return 0.0,
    };

    let elapsed_ms = last.timestamp.saturating_sub(first.timestamp);
    if elapsed_ms == 0 {
        return 0.0;
    }

    let rate = (last.temperature - first.temperature) / ms_to_minutes(elapsed_ms);
    rate.round_to(RATE_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: u64 = 60_000;

    fn window(points: &[(u64, f64)]) -> Window {
        Window::new(
            points
                .iter()
                .map(|&(minute, temp)| Reading::new(minute * MINUTE, temp, 8.0))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn one_degree_over_five_minutes() {
        let w = window(&[(0, 20.0), (5, 21.0)]);
        assert_eq!(rate_of_change(&w, 30), 0.2);
    }

    #[test]
    fn cooling_is_negative() {
        let w = window(&[(0, 4.0), (2, 3.0)]);
        assert_eq!(rate_of_change(&w, 30), -0.5);
    }

    #[test]
    fn only_last_timeframe_counts() {
        // Reading at minute 0 is outside the 10-minute window ending at 30
        let w = window(&[(0, -5.0), (20, 2.0), (30, 3.0)]);
        assert_eq!(rate_of_change(&w, 10), 0.1);
        assert_eq!(rate_of_change(&w, 60), 0.2667);
    }

    #[test]
    fn insufficient_data_is_zero() {
        assert_eq!(rate_of_change(&Window::empty(), 30), 0.0);
        assert_eq!(rate_of_change(&window(&[(0, 4.0)]), 30), 0.0);
        assert_eq!(rate_of_change(&window(&[(0, 4.0), (0, 9.0)]), 30), 0.0);
    }

    #[test]
    fn explicit_anchor_ignores_stale_data() {
        let w = window(&[(0, 4.0), (5, 5.0)]);
        // Wall clock an hour after the last sample: nothing in the last 30 minutes
        assert_eq!(rate_of_change_at(&w, 30, 65 * MINUTE), 0.0);
        assert_eq!(rate_of_change_at(&w, 30, 5 * MINUTE), 0.2);
    }

    #[test]
    fn rounds_to_four_decimals() {
        let w = window(&[(0, 0.0), (3, 1.0)]);
        assert_eq!(rate_of_change(&w, 30), 0.3333);
    }

    #[test]
    fn instant_rates_per_pair() {
        let w = window(&[(0, 1.0), (1, 2.0), (1, 5.0), (3, 4.0)]);
        assert_eq!(instant_rates(&w), vec![1.0, 0.0, -0.5]);
        assert!(instant_rates(&Window::empty()).is_empty());
    }
}
