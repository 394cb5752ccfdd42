//! Cost-risk projection
//!
//! Converts exposure hours into an estimated monetary loss using an
//! external market price. Loss grows linearly with exposure until the
//! critical limit, where the whole assumed inventory is written off.
//!
//! ```text
//! risk_factor
//!   1.0 |            ____________
//!       |          /
//!       |        /
//!       |      /
//!   0.0 |____/
//!       +----+-------+-----------> hours at risk
//!            0     limit (4h)
//! ```
//!
//! The price arrives as a [`PriceSource`] so a fallback value can never be
//! mistaken for a live market read.

use crate::{
    constants::risk::MONEY_DECIMALS,
    traits::{RoundTo, Validatable},
};

/// Market price per kilogram, tagged with where it came from
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "price_per_kg", rename_all = "snake_case"))]
pub enum PriceSource {
    /// Averaged from the live market record set
    Live(f64),
    /// Feed missing or malformed; documented fallback constant
    Fallback(f64),
}

impl PriceSource {
    /// Price per kilogram regardless of origin
    pub fn value(&self) -> f64 {
        match *self {
            Self::Live(value) | Self::Fallback(value) => value,
        }
    }

    /// Cost estimates built on this price are lower quality
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// Live price if usable, otherwise the fallback
    ///
    /// A live price must be finite and non-negative.
    pub fn live_or(price: Option<f64>, fallback: f64) -> Self {
        match price {
            Some(value) if value.is_valid() && value >= 0.0 => Self::Live(value),
            _ => Self::Fallback(fallback),
        }
    }
}

/// Exposure normalized against the critical limit, clamped to `[0, 1]`
///
/// A non-positive limit means any exposure is a total loss.
pub fn risk_factor(hours_at_risk: f64, critical_exposure_limit_hours: f64) -> f64 {
    if hours_at_risk <= 0.0 {
        return 0.0;
    }
    if critical_exposure_limit_hours <= 0.0 {
        return 1.0;
    }

    (hours_at_risk / critical_exposure_limit_hours).min(1.0)
}

/// Estimated loss in currency units, rounded to cents
pub fn estimated_cost(
    hours_at_risk: f64,
    avg_price_per_kg: f64,
    assumed_inventory_kg: f64,
    critical_exposure_limit_hours: f64,
) -> f64 {
    let factor = risk_factor(hours_at_risk, critical_exposure_limit_hours);
    (factor * avg_price_per_kg * assumed_inventory_kg).round_to(MONEY_DECIMALS)
}
