//! Analytics configuration
//!
//! Every policy knob the calculators use, with the production defaults from
//! [`constants`](crate::constants). Build with the `with_*` methods and
//! finish with [`AnalyticsConfig::validate`] when the values come from
//! outside the program.
//!
//! ```rust
//! use chillguard_core::AnalyticsConfig;
//!
//! let config = AnalyticsConfig::default()
//!     .with_gap_cap_hours(0.25)
//!     .with_default_timeframe_minutes(360)
//!     .with_max_rows(5_000)
//!     .validate()?;
//!
//! assert_eq!(config.max_rows, 5_000);
//! # Ok::<(), chillguard_core::AnalyticsError>(())
//! ```

use crate::{
    constants::{
        buffers::{rows_for, DEFAULT_MAX_ROWS, MIN_MAX_ROWS},
        risk::{
            ASSUMED_INVENTORY_KG, CRITICAL_EXPOSURE_LIMIT_HOURS, EXPECTED_SAMPLES_PER_MINUTE,
            FALLBACK_PRICE_PER_KG, GAP_CAP_HOURS, MONTHLY_COST_RATIO,
        },
        time::{DEFAULT_RATE_WINDOW_MINUTES, DEFAULT_REPORT_TIMEFRAME_MINUTES},
    },
    errors::{AnalyticsError, AnalyticsResult},
    traits::Validatable,
};

/// Policy parameters for all calculators
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalyticsConfig {
    /// Intervals this long or longer are outages, not exposure
    pub gap_cap_hours: f64,
    /// Sampling rate a healthy sensor should achieve
    pub expected_samples_per_minute: u32,
    /// Inventory mass assumed per chamber
    pub assumed_inventory_kg: f64,
    /// Exposure at which the whole inventory is considered lost
    pub critical_exposure_limit_hours: f64,
    /// Price used when the market feed fails
    pub fallback_price_per_kg: f64,
    /// Telemetry buffer size requested from the loader
    pub max_rows: usize,
    /// Window for the rate-of-change trend
    pub rate_window_minutes: u32,
    /// Report timeframe when the caller gives none
    pub default_timeframe_minutes: u32,
    /// Monthly projection as a share of the exposure cost
    pub monthly_cost_ratio: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            gap_cap_hours: GAP_CAP_HOURS,
            expected_samples_per_minute: EXPECTED_SAMPLES_PER_MINUTE,
            assumed_inventory_kg: ASSUMED_INVENTORY_KG,
            critical_exposure_limit_hours: CRITICAL_EXPOSURE_LIMIT_HOURS,
            fallback_price_per_kg: FALLBACK_PRICE_PER_KG,
            max_rows: DEFAULT_MAX_ROWS,
            rate_window_minutes: DEFAULT_RATE_WINDOW_MINUTES,
            default_timeframe_minutes: DEFAULT_REPORT_TIMEFRAME_MINUTES,
            monthly_cost_ratio: MONTHLY_COST_RATIO,
        }
    }
}

impl AnalyticsConfig {
    /// Set the outage-exclusion gap cap
    pub fn with_gap_cap_hours(mut self, hours: f64) -> Self {
        self.gap_cap_hours = hours;
        self
    }

    /// Set the expected sampling rate
    pub fn with_expected_samples_per_minute(mut self, samples: u32) -> Self {
        self.expected_samples_per_minute = samples;
        self
    }

    /// Set the assumed inventory mass
    pub fn with_assumed_inventory_kg(mut self, kg: f64) -> Self {
        self.assumed_inventory_kg = kg;
        self
    }

    /// Set the exposure limit for full loss
    pub fn with_critical_exposure_limit_hours(mut self, hours: f64) -> Self {
        self.critical_exposure_limit_hours = hours;
        self
    }

    /// Set the price used when the feed is degraded
    pub fn with_fallback_price_per_kg(mut self, price: f64) -> Self {
        self.fallback_price_per_kg = price;
        self
    }

    /// Set the telemetry buffer size
    pub fn with_max_rows(mut self, rows: usize) -> Self {
        self.max_rows = rows;
        self
    }

    /// Set the rate-of-change window
    pub fn with_rate_window_minutes(mut self, minutes: u32) -> Self {
        self.rate_window_minutes = minutes;
        self
    }

    /// Set the default report timeframe
    pub fn with_default_timeframe_minutes(mut self, minutes: u32) -> Self {
        self.default_timeframe_minutes = minutes;
        self
    }

    /// Set the monthly projection ratio
    pub fn with_monthly_cost_ratio(mut self, ratio: f64) -> Self {
        self.monthly_cost_ratio = ratio;
        self
    }

    /// `max_rows` holds `minutes` of telemetry at the expected sampling rate
    pub fn buffer_covers(&self, minutes: u32) -> bool {
        self.max_rows as u64 >= rows_for(minutes, self.expected_samples_per_minute)
    }

    /// Check every parameter and return the config unchanged if usable
    pub fn validate(self) -> AnalyticsResult<Self> {
        if !self.gap_cap_hours.is_valid() || self.gap_cap_hours <= 0.0 {
            return Err(AnalyticsError::InvalidConfig {
                reason: "gap cap must be a positive number of hours",
            });
        }

        if !self.critical_exposure_limit_hours.is_valid() || self.critical_exposure_limit_hours <= 0.0 {
            return Err(AnalyticsError::InvalidConfig {
                reason: "critical exposure limit must be a positive number of hours",
            });
        }

        if !self.assumed_inventory_kg.is_valid() || self.assumed_inventory_kg < 0.0 {
            return Err(AnalyticsError::InvalidConfig {
                reason: "assumed inventory must be a non-negative mass",
            });
        }

        if !self.fallback_price_per_kg.is_valid() || self.fallback_price_per_kg < 0.0 {
            return Err(AnalyticsError::InvalidConfig {
                reason: "fallback price must be a non-negative number",
            });
        }

        if !self.monthly_cost_ratio.is_valid() || self.monthly_cost_ratio < 0.0 {
            return Err(AnalyticsError::InvalidConfig {
                reason: "monthly cost ratio must be non-negative",
            });
        }

        if self.max_rows < MIN_MAX_ROWS {
            return Err(AnalyticsError::InvalidConfig {
                reason: "telemetry buffer must hold at least two readings",
            });
        }

        if !self.buffer_covers(self.default_timeframe_minutes.max(self.rate_window_minutes)) {
            return Err(AnalyticsError::InvalidConfig {
                reason: "telemetry buffer narrower than the default timeframe at the expected sampling rate",
            });
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.gap_cap_hours, 0.2);
        assert_eq!(config.expected_samples_per_minute, 12);
        assert_eq!(config.assumed_inventory_kg, 200.0);
        assert_eq!(config.critical_exposure_limit_hours, 4.0);
        assert_eq!(config.fallback_price_per_kg, 25.50);
        assert_eq!(config.max_rows, 518_400);
        assert!(config.buffer_covers(config.default_timeframe_minutes));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_overrides() {
        let config = AnalyticsConfig::default()
            .with_expected_samples_per_minute(6)
            .with_rate_window_minutes(10)
            .with_default_timeframe_minutes(60);

        assert_eq!(config.expected_samples_per_minute, 6);
        assert_eq!(config.rate_window_minutes, 10);
        assert_eq!(config.default_timeframe_minutes, 60);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(AnalyticsConfig::default().with_gap_cap_hours(0.0).validate().is_err());
        assert!(AnalyticsConfig::default().with_gap_cap_hours(f64::NAN).validate().is_err());
        assert!(AnalyticsConfig::default().with_critical_exposure_limit_hours(-1.0).validate().is_err());
        assert!(AnalyticsConfig::default().with_fallback_price_per_kg(-0.5).validate().is_err());
        assert!(AnalyticsConfig::default().with_max_rows(1).validate().is_err());
    }

    #[test]
    fn rejects_buffer_narrower_than_default_timeframe() {
        // 2000 rows hold under three hours at 12 samples/min
        let narrow = AnalyticsConfig::default().with_max_rows(2000);
        assert!(matches!(narrow.validate(), Err(AnalyticsError::InvalidConfig { .. })));

        let consistent = narrow.with_default_timeframe_minutes(120);
        assert!(consistent.validate().is_ok());

        // Sparser sensors need fewer rows for the same horizon
        let sparse = narrow.with_expected_samples_per_minute(1).with_default_timeframe_minutes(1_440);
        assert!(sparse.validate().is_ok());
    }
}
