//! KPI report assembly
//!
//! [`KpiReportBuilder`] runs the calculators over one already-fetched window
//! and packs the results, together with the external alert count and price,
//! into a [`KpiReport`]. It performs no I/O: fetching the inputs is the
//! caller's job (see `chillguard-connectors`), which keeps this layer
//! testable with synthetic windows.
//!
//! ## Anchors per field
//!
//! | Field                | Anchor                                    |
//! |----------------------|-------------------------------------------|
//! | `hours_at_risk`      | newest reading (event time)               |
//! | `estimated_cost`     | derived from `hours_at_risk`              |
//! | `avg_rate_of_change` | `now` (wall clock), own shorter window    |
//! | `uptime_percentage`  | `now` (wall clock)                        |
//! | `total_alerts`       | `now` (wall clock), counted by the caller |
//!
//! A window that fills `max_rows` yet starts after the earliest cutoff above
//! was truncated by the loader; building from it fails with
//! [`AnalyticsError::TruncatedWindow`] rather than under-reporting.
//!
//! ## Example
//!
//! ```rust
//! use chillguard_core::{
//!     AnalyticsConfig, KpiInputs, KpiReportBuilder, PriceSource, Reading, Window,
//! };
//!
//! let window = Window::new(vec![
//!     Reading::new(0, 9.0, 8.0),
//!     Reading::new(300_000, 9.5, 8.0),
//! ])?;
//!
//! let builder = KpiReportBuilder::new(AnalyticsConfig::default());
//! let report = builder.build(KpiInputs {
//!     chamber_id: "CF-1",
//!     window: &window,
//!     now: 300_000,
//!     timeframe_minutes: 60,
//!     total_alerts: 2,
//!     price: PriceSource::Live(25.5),
//! })?;
//!
//! assert_eq!(report.hours_at_risk, 0.0833);
//! assert_eq!(report.total_alerts, 2);
//! assert!(!report.price_source.is_degraded());
//! # Ok::<(), chillguard_core::AnalyticsError>(())
//! ```

#[cfg(not(feature = "std"))]
use alloc::string::{String, ToString};

use crate::{
    analytics::{cost, rate, reliability, risk, PriceSource},
    config::AnalyticsConfig,
    constants::risk::{MAX_UPTIME_PERCENT, MONEY_DECIMALS, RATE_DECIMALS},
    errors::{AnalyticsError, AnalyticsResult},
    time::{minutes_to_ms, ms_to_hours, window_start, Timestamp},
    traits::{RoundTo, Validatable},
    window::Window,
};

/// Slack for float summation when checking exposure against the timeframe
const EXPOSURE_EPSILON_HOURS: f64 = 1e-9;

/// Per-chamber KPI record for the reporting surface
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KpiReport {
    /// Chamber (and sensor) identifier
    pub chamber_id: String,
    /// Exposure above threshold, 4 decimals
    pub hours_at_risk: f64,
    /// Projected loss, 2 decimals
    pub estimated_cost: f64,
    /// Sample delivery ratio in percent, 2 decimals, at most 100
    pub uptime_percentage: f64,
    /// Recent trend in °C per minute, 4 decimals
    pub avg_rate_of_change: f64,
    /// Alert events within the timeframe
    pub total_alerts: u32,
    /// Timeframe the report covers
    pub timeframe_minutes: u32,
    /// Share of `estimated_cost` projected per month, 2 decimals
    pub monthly_cost: f64,
    /// Price behind `estimated_cost`, tagged live or fallback
    pub price_source: PriceSource,
}

impl KpiReport {
    /// Cost figures rest on the fallback price
    pub fn is_degraded(&self) -> bool {
        self.price_source.is_degraded()
    }
}

/// Everything one report needs, already fetched
#[derive(Debug, Clone, Copy)]
pub struct KpiInputs<'a> {
    /// Chamber identifier
    pub chamber_id: &'a str,
    /// Telemetry buffer for the chamber's sensor
    pub window: &'a Window,
    /// Wall-clock instant of the request
    pub now: Timestamp,
    /// Report timeframe
    pub timeframe_minutes: u32,
    /// Alerts counted since `now - timeframe`
    pub total_alerts: u32,
    /// Market price per kilogram
    pub price: PriceSource,
}

/// Runs the calculators and assembles a [`KpiReport`]
#[derive(Debug, Clone, Default)]
pub struct KpiReportBuilder {
    config: AnalyticsConfig,
}

impl KpiReportBuilder {
    /// Create a builder with the given policy
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    /// Policy in use
    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Compute and assemble one report
    pub fn build(&self, inputs: KpiInputs<'_>) -> AnalyticsResult<KpiReport> {
        let config = &self.config;
        let KpiInputs { chamber_id, window, now, timeframe_minutes, total_alerts, price } = inputs;

        if price.is_degraded() {
            log_warn!(
                "chamber {}: cost estimate uses fallback price {}",
                chamber_id,
                price.value()
            );
        }

        self.check_coverage(window, now, timeframe_minutes)?;

        let hours = risk::hours_at_risk(window, timeframe_minutes, config.gap_cap_hours);
        let timeframe_hours = ms_to_hours(minutes_to_ms(timeframe_minutes));
        if !hours.is_valid() || hours < 0.0 || hours > timeframe_hours + EXPOSURE_EPSILON_HOURS {
            return Err(AnalyticsError::InconsistentReport {
                field: "hours_at_risk",
                reason: "exposure outside the report timeframe",
            });
        }

        let estimated_cost = cost::estimated_cost(
            hours,
            price.value(),
            config.assumed_inventory_kg,
            config.critical_exposure_limit_hours,
        );

        let actual = reliability::count_since(window, now, timeframe_minutes);
        let uptime_percentage =
            reliability::uptime(actual, timeframe_minutes, config.expected_samples_per_minute);

        let avg_rate_of_change = rate::rate_of_change_at(window, config.rate_window_minutes, now);
        let monthly_cost = (estimated_cost * config.monthly_cost_ratio).round_to(MONEY_DECIMALS);

        let report = KpiReport {
            chamber_id: chamber_id.to_string(),
            hours_at_risk: hours.round_to(RATE_DECIMALS),
            estimated_cost,
            uptime_percentage,
            avg_rate_of_change,
            total_alerts,
            timeframe_minutes,
            monthly_cost,
            price_source: price,
        };

        self.check(&report)?;

        log_debug!(
            "chamber {}: {} h at risk, cost {}, uptime {}%",
            report.chamber_id,
            report.hours_at_risk,
            report.estimated_cost,
            report.uptime_percentage
        );

        Ok(report)
    }

    /// Reject a buffer the loader cut short of the analysis window
    fn check_coverage(&self, window: &Window, now: Timestamp, timeframe_minutes: u32) -> AnalyticsResult<()> {
        let (first, anchor) = match (window.first(), window.anchor()) {
            (Some(first), Some(anchor)) => (first.timestamp, anchor),
            _ => return Ok(()),
        };

        let minutes = timeframe_minutes.max(self.config.rate_window_minutes);
        let cutoff = window_start(anchor.min(now), minutes);

        if window.len() >= self.config.max_rows && first > cutoff {
            log_warn!(
                "telemetry buffer of {} rows starts {} ms after the {} min cutoff",
                window.len(),
                first - cutoff,
                minutes
            );
            return Err(AnalyticsError::TruncatedWindow {
                rows: window.len(),
                timeframe_minutes: minutes,
            });
        }

        Ok(())
    }

    /// Rounding consistency checks on an assembled report
    fn check(&self, report: &KpiReport) -> AnalyticsResult<()> {
        let max_cost = (report.price_source.value() * self.config.assumed_inventory_kg)
            .round_to(MONEY_DECIMALS);

        if !report.estimated_cost.is_valid()
            || report.estimated_cost < 0.0
            || report.estimated_cost > max_cost
        {
            return Err(AnalyticsError::InconsistentReport {
                field: "estimated_cost",
                reason: "cost outside [0, full inventory value]",
            });
        }

        if !report.uptime_percentage.is_valid()
            || !(0.0..=MAX_UPTIME_PERCENT).contains(&report.uptime_percentage)
        {
            return Err(AnalyticsError::InconsistentReport {
                field: "uptime_percentage",
                reason: "uptime outside [0, 100]",
            });
        }

        if !report.avg_rate_of_change.is_valid() {
            return Err(AnalyticsError::InconsistentReport {
                field: "avg_rate_of_change",
                reason: "rate is not finite",
            });
        }

        if !report.monthly_cost.is_valid() || report.monthly_cost < 0.0 {
            return Err(AnalyticsError::InconsistentReport {
                field: "monthly_cost",
                reason: "monthly projection is negative or not finite",
            });
        }

        Ok(())
    }
}

/// Overall fleet condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SystemHealth {
    /// No exposure, live prices, every chamber reachable
    Good,
    /// Some exposure, a fallback price, or an unreachable chamber
    Degraded,
    /// At least one chamber at the full-loss exposure limit
    Critical,
}

/// Aggregate view over many chamber reports
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemStatistics {
    /// Reports aggregated
    pub chambers: usize,
    /// Chambers with any exposure
    pub chambers_at_risk: usize,
    /// Chambers at or beyond the critical exposure limit
    pub chambers_critical: usize,
    /// Chambers whose report could not be produced
    pub unavailable: usize,
    /// Sum of exposure hours, 4 decimals
    pub total_hours_at_risk: f64,
    /// Sum of estimated costs, 2 decimals
    pub total_risk_exposure: f64,
    /// Sum of alert counts
    pub total_alerts: u64,
    /// Reports whose cost rests on the fallback price
    pub degraded_estimates: usize,
    /// Overall condition
    pub system_health: SystemHealth,
}

impl SystemStatistics {
    /// Aggregate reports produced under `config`
    pub fn from_reports(reports: &[KpiReport], config: &AnalyticsConfig) -> Self {
        let mut stats = Self {
            chambers: reports.len(),
            chambers_at_risk: 0,
            chambers_critical: 0,
            unavailable: 0,
            total_hours_at_risk: 0.0,
            total_risk_exposure: 0.0,
            total_alerts: 0,
            degraded_estimates: 0,
            system_health: SystemHealth::Good,
        };

        for report in reports {
            if report.hours_at_risk > 0.0 {
                stats.chambers_at_risk += 1;
            }
            if report.hours_at_risk >= config.critical_exposure_limit_hours {
                stats.chambers_critical += 1;
            }
            if report.is_degraded() {
                stats.degraded_estimates += 1;
            }
            stats.total_hours_at_risk += report.hours_at_risk;
            stats.total_risk_exposure += report.estimated_cost;
            stats.total_alerts += report.total_alerts as u64;
        }

        stats.total_hours_at_risk = stats.total_hours_at_risk.round_to(RATE_DECIMALS);
        stats.total_risk_exposure = stats.total_risk_exposure.round_to(MONEY_DECIMALS);
        stats.system_health = stats.classify();
        stats
    }

    /// Record chambers whose report failed and reclassify
    pub fn with_unavailable(mut self, unavailable: usize) -> Self {
        self.unavailable = unavailable;
        self.system_health = self.classify();
        self
    }

    fn classify(&self) -> SystemHealth {
        if self.chambers_critical > 0 {
            SystemHealth::Critical
        } else if self.chambers_at_risk > 0 || self.degraded_estimates > 0 || self.unavailable > 0 {
            SystemHealth::Degraded
        } else {
            SystemHealth::Good
        }
    }
}
