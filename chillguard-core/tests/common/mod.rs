//! Common test utilities and window generators for integration tests
//!
//! This module provides:
//! - Chamber telemetry generators with controllable excursions and outages
//! - Pre-built chamber scenarios (see [`scenarios`])
//! - Assertion helpers for float KPIs

#![allow(dead_code)]

use chillguard_core::{Reading, Timestamp, Window};

pub mod scenarios;

/// One minute in milliseconds
pub const MINUTE: u64 = 60_000;

/// Default sampling period: one reading every 5 seconds
pub const SAMPLE_PERIOD_MS: u64 = 5_000;

/// Test data generator for chamber telemetry
pub struct WindowGenerator {
    start: Timestamp,
    threshold: f64,
    seed: u32,
    readings: Vec<Reading>,
    cursor: Timestamp,
}

impl WindowGenerator {
    /// Generator starting at `start` for a chamber with `threshold`
    pub fn new(start: Timestamp, threshold: f64) -> Self {
        Self {
            start,
            threshold,
            seed: 42,
            readings: Vec::new(),
            cursor: start,
        }
    }

    /// Steady temperature with small noise for `minutes`, sampled every `period_ms`
    pub fn steady(mut self, base_temp: f64, minutes: u64, period_ms: u64) -> Self {
        let end = self.cursor + minutes * MINUTE;
        while self.cursor < end {
            let noise = self.random_noise(0.05);
            self.push(base_temp + noise);
            self.cursor += period_ms;
        }
        self
    }

    /// Linear ramp from `from` to `to` over `minutes`
    pub fn ramp(mut self, from: f64, to: f64, minutes: u64, period_ms: u64) -> Self {
        let span = minutes * MINUTE;
        let end = self.cursor + span;
        let origin = self.cursor;
        while self.cursor < end {
            let progress = (self.cursor - origin) as f64 / span as f64;
            self.push(from + (to - from) * progress);
            self.cursor += period_ms;
        }
        self
    }

    /// Sensor silent for `minutes`
    pub fn outage(mut self, minutes: u64) -> Self {
        self.cursor += minutes * MINUTE;
        self
    }

    /// Single reading at the cursor
    pub fn sample(mut self, temperature: f64) -> Self {
        self.push(temperature);
        self
    }

    /// Finish the window
    pub fn build(self) -> Window {
        Window::new(self.readings).expect("generator emits ordered readings")
    }

    /// Timestamp the next reading would get
    pub fn cursor(&self) -> Timestamp {
        self.cursor
    }

    /// Timestamp of the first generated reading
    pub fn start(&self) -> Timestamp {
        self.start
    }

    fn push(&mut self, temperature: f64) {
        self.readings.push(Reading::new(self.cursor, temperature, self.threshold));
    }

    // Simple LCG so runs are reproducible
    fn random_float(&mut self) -> f64 {
        self.seed = self.seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (self.seed >> 16) as f64 / 65_535.0
    }

    fn random_noise(&mut self, amplitude: f64) -> f64 {
        (self.random_float() * 2.0 - 1.0) * amplitude
    }
}

/// Window from `(minute, temperature)` pairs against one threshold
pub fn window_from_minutes(points: &[(u64, f64)], threshold: f64) -> Window {
    Window::new(
        points
            .iter()
            .map(|&(minute, temp)| Reading::new(minute * MINUTE, temp, threshold))
            .collect(),
    )
    .expect("points are in ascending order")
}

/// Assert two floats agree to `tolerance`
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}
