//! Risk, Cost and Reliability Policy
//!
//! These values decide what counts as exposure, how exposure turns into
//! money, and how many samples a healthy sensor should deliver.

// ===== EXPOSURE =====

/// Outage-exclusion gap cap (hours).
///
/// An interval whose successor arrives this late or later is treated as a
/// sensor outage, not as continuous time in danger. 0.2 h = 12 minutes.
pub const GAP_CAP_HOURS: f64 = 0.2;

/// Exposure at which the full inventory is assumed lost (hours).
///
/// Below it the loss scales linearly with exposure.
pub const CRITICAL_EXPOSURE_LIMIT_HOURS: f64 = 4.0;

// ===== COST =====

/// Inventory mass assumed to sit in one chamber (kg).
pub const ASSUMED_INVENTORY_KG: f64 = 200.0;

/// Price used when the market feed is unavailable or malformed (per kg).
///
/// Matches the reference premium cut in the market record set.
pub const FALLBACK_PRICE_PER_KG: f64 = 25.50;

/// Share of the exposure cost reported as the monthly projection.
pub const MONTHLY_COST_RATIO: f64 = 0.1;

// ===== RELIABILITY =====

/// Samples a healthy sensor delivers per minute (one every 5 seconds).
pub const EXPECTED_SAMPLES_PER_MINUTE: u32 = 12;

/// Uptime ceiling (percent).
pub const MAX_UPTIME_PERCENT: f64 = 100.0;

// ===== ROUNDING =====

/// Decimal places for rates and exposure hours.
pub const RATE_DECIMALS: u32 = 4;

/// Decimal places for money and percentages.
pub const MONEY_DECIMALS: u32 = 2;
