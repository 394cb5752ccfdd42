//! Ordered Telemetry Windows
//!
//! ## Overview
//!
//! A [`Window`] is the buffer of readings fetched for one sensor for the
//! duration of one computation call. It is ordered by timestamp
//! (non-decreasing), may contain irregular gaps, and is immutable once built:
//! every calculator borrows it and none can change it.
//!
//! ## Why validate at construction?
//!
//! All analytics walk consecutive pairs of readings. An out-of-order pair
//! would produce a negative duration and a NaN temperature would poison every
//! sum it touches. Checking once here lets every calculator assume a clean,
//! sorted slice and stay branch-free in the hot loop.
//!
//! ## Sub-windows
//!
//! Because the buffer is sorted, "everything at or after `cutoff`" is a
//! suffix of the slice and is found by binary search:
//!
//! ```text
//! readings:  t=0   t=5   t=10   t=15   t=20
//!                         ^
//!                         since(10) starts here
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use chillguard_core::{Reading, Window};
//!
//! let window = Window::new(vec![
//!     Reading::new(0, 4.0, 8.0),
//!     Reading::new(300_000, 9.0, 8.0),
//! ])?;
//!
//! assert_eq!(window.len(), 2);
//! assert_eq!(window.anchor(), Some(300_000));
//! assert_eq!(window.since(300_000).len(), 1);
//! # Ok::<(), chillguard_core::WindowError>(())
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::{
    errors::WindowError,
    time::Timestamp,
    traits::Validatable,
};

/// Single temperature sample with the chamber threshold in force
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// Sample time in milliseconds since epoch
    pub timestamp: Timestamp,
    /// Measured temperature in °C
    pub temperature: f64,
    /// Warning threshold joined at fetch time in °C
    pub threshold: f64,
}

impl Reading {
    /// Create a reading
    pub const fn new(timestamp: Timestamp, temperature: f64, threshold: f64) -> Self {
        Self { timestamp, temperature, threshold }
    }

    /// Temperature strictly above the threshold
    pub fn exceeds_threshold(&self) -> bool {
        self.temperature > self.threshold
    }
}

/// Timestamp-ordered buffer of readings for one sensor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Window {
    readings: Vec<Reading>,
}

impl Window {
    /// Empty window, the loader's answer for a sensor with no data
    pub const fn empty() -> Self {
        Self { readings: Vec::new() }
    }

    /// Build a window from readings already in ascending timestamp order
    ///
    /// Equal timestamps are allowed. Rejects out-of-order and non-finite input.
    pub fn new(readings: Vec<Reading>) -> Result<Self, WindowError> {
        for (index, reading) in readings.iter().enumerate() {
            if !reading.temperature.is_valid() || !reading.threshold.is_valid() {
                return Err(WindowError::InvalidValue { index });
            }
        }

        if let Some(index) = readings
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            return Err(WindowError::OutOfOrder { index: index + 1 });
        }

        Ok(Self { readings })
    }

    /// Build a window from readings in any order
    ///
    /// Sorting is stable, so readings sharing a timestamp keep their input order.
    pub fn from_unsorted(mut readings: Vec<Reading>) -> Result<Self, WindowError> {
        readings.sort_by_key(|reading| reading.timestamp);
        Self::new(readings)
    }

    /// All readings, oldest first
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Number of readings
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Check if the window holds no readings
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Oldest reading
    pub fn first(&self) -> Option<&Reading> {
        self.readings.first()
    }

    /// Newest reading
    pub fn last(&self) -> Option<&Reading> {
        self.readings.last()
    }

    /// Event-time anchor: the newest timestamp in the buffer
    pub fn anchor(&self) -> Option<Timestamp> {
        self.last().map(|reading| reading.timestamp)
    }

    /// Readings with `timestamp >= cutoff`
    pub fn since(&self, cutoff: Timestamp) -> &[Reading] {
        let start = self.readings.partition_point(|reading| reading.timestamp < cutoff);
        &self.readings[start..]
    }

    /// Number of readings with `timestamp >= cutoff`
    pub fn count_since(&self, cutoff: Timestamp) -> usize {
        self.since(cutoff).len()
    }

    /// Iterate readings oldest first
    pub fn iter(&self) -> core::slice::Iter<'_, Reading> {
        self.readings.iter()
    }
}

impl<'a> IntoIterator for &'a Window {
    type Item = &'a Reading;
    type IntoIter = core::slice::Iter<'a, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(minute: u64, temperature: f64) -> Reading {
        Reading::new(minute * 60_000, temperature, 8.0)
    }

    #[test]
    fn accepts_sorted_and_equal_timestamps() {
        let window = Window::new(vec![reading(0, 4.0), reading(0, 4.2), reading(5, 4.4)]).unwrap();
        assert_eq!(window.len(), 3);
        assert_eq!(window.anchor(), Some(300_000));
    }

    #[test]
    fn rejects_out_of_order() {
        let result = Window::new(vec![reading(5, 4.0), reading(0, 4.0)]);
        assert_eq!(result, Err(WindowError::OutOfOrder { index: 1 }));
    }

    #[test]
    fn rejects_non_finite() {
        let result = Window::new(vec![reading(0, 4.0), reading(1, f64::NAN)]);
        assert_eq!(result, Err(WindowError::InvalidValue { index: 1 }));

        let bad_threshold = Reading::new(0, 4.0, f64::INFINITY);
        assert!(Window::new(vec![bad_threshold]).is_err());
    }

    #[test]
    fn from_unsorted_orders_newest_first_input() {
        let window = Window::from_unsorted(vec![reading(10, 3.0), reading(5, 2.0), reading(0, 1.0)]).unwrap();
        let temps: Vec<f64> = window.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn since_is_inclusive_suffix() {
        let window = Window::new(vec![reading(0, 1.0), reading(5, 2.0), reading(10, 3.0)]).unwrap();
        assert_eq!(window.since(300_000).len(), 2);
        assert_eq!(window.since(300_001).len(), 1);
        assert_eq!(window.since(0).len(), 3);
        assert!(window.since(u64::MAX).is_empty());
    }

    #[test]
    fn empty_window_has_no_anchor() {
        let window = Window::empty();
        assert!(window.is_empty());
        assert_eq!(window.anchor(), None);
        assert_eq!(window.count_since(0), 0);
    }
}
