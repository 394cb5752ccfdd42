//! Pre-built chamber scenarios for integration testing
//!
//! Mirrors the deterministic simulation the backend runs for end-to-end
//! checks:
//! - CF-1: freezer starts hot, someone closes the door
//! - CF-2: fridge starts normal, fails late
//! - REF-3: control chamber, always normal
//! - Flaky: hot chamber whose sensor keeps dropping offline

use chillguard_core::{Timestamp, Window};

use super::{WindowGenerator, MINUTE};

/// Scenario start: 2024-12-11T22:30:00Z
pub const SCENARIO_START: Timestamp = 1_733_956_200_000;

/// Scenario sampling period (3 seconds)
pub const SCENARIO_PERIOD_MS: u64 = 3_000;

/// Chamber scenario with its expected exposure
pub struct ChamberScenario {
    pub name: &'static str,
    pub window: Window,
    pub timeframe_minutes: u32,
    pub expected_hours_at_risk: f64,
}

/// Pre-built scenario definitions
pub struct Scenarios;

impl Scenarios {
    /// Freezer at -16 °C (threshold -18 °C) for 15 minutes, then back to -21 °C
    pub fn cf1_door_closed() -> ChamberScenario {
        let window = WindowGenerator::new(SCENARIO_START, -18.0)
            .ramp(-16.0, -16.0, 15, SCENARIO_PERIOD_MS)
            .ramp(-21.0, -21.0, 45, SCENARIO_PERIOD_MS)
            .build();

        ChamberScenario {
            name: "cf1_door_closed",
            window,
            timeframe_minutes: 120,
            // Last hot interval ends at the first cold reading
            expected_hours_at_risk: 0.25,
        }
    }

    /// Fridge at 4 °C for 21 minutes, then 10 °C (threshold 8 °C) for 39 minutes
    pub fn cf2_late_failure() -> ChamberScenario {
        let window = WindowGenerator::new(SCENARIO_START, 8.0)
            .ramp(4.0, 4.0, 21, SCENARIO_PERIOD_MS)
            .ramp(10.0, 10.0, 39, SCENARIO_PERIOD_MS)
            .build();

        ChamberScenario {
            name: "cf2_late_failure",
            window,
            timeframe_minutes: 120,
            // The final reading opens no interval
            expected_hours_at_risk: (39.0 * 60.0 - 3.0) / 3600.0,
        }
    }

    /// Control chamber at 2 °C against a 5 °C threshold
    pub fn ref3_control() -> ChamberScenario {
        let window = WindowGenerator::new(SCENARIO_START, 5.0)
            .steady(2.0, 60, SCENARIO_PERIOD_MS)
            .build();

        ChamberScenario {
            name: "ref3_control",
            window,
            timeframe_minutes: 120,
            expected_hours_at_risk: 0.0,
        }
    }

    /// Hot chamber with 5-minute bursts separated by 20-minute outages
    pub fn flaky_sensor() -> ChamberScenario {
        let mut generator = WindowGenerator::new(SCENARIO_START, 8.0);
        for _ in 0..3 {
            generator = generator
                .ramp(9.0, 9.0, 5, MINUTE)
                .sample(9.0)
                .outage(20);
        }

        ChamberScenario {
            name: "flaky_sensor",
            window: generator.build(),
            timeframe_minutes: 240,
            // Each burst has 5 one-minute intervals; every outage gap is skipped
            expected_hours_at_risk: 3.0 * 5.0 / 60.0,
        }
    }

    /// Every scenario
    pub fn all() -> Vec<ChamberScenario> {
        vec![
            Self::cf1_door_closed(),
            Self::cf2_late_failure(),
            Self::ref3_control(),
            Self::flaky_sensor(),
        ]
    }
}
