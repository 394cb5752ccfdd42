//! Cold-chain analytics engine for ChillGuard
//!
//! Turns a buffer of chamber temperature readings into operational KPIs:
//! time spent above threshold, projected loss, sampling uptime and the
//! recent temperature trend.
//!
//! Key constraints:
//! - Pure functions over an immutable [`Window`]; no I/O, no shared state
//! - Never fails on thin data; too few readings yield `0.0`
//! - `no_std` + `alloc` capable
//!
//! ```no_run
//! use chillguard_core::{analytics::risk, Reading, Window};
//!
//! let window = Window::new(vec![
//!     Reading::new(0, 9.0, 8.0),
//!     Reading::new(600_000, 9.0, 8.0),
//! ]).unwrap();
//!
//! // Ten minutes above threshold, under the 12-minute outage cap
//! let hours = risk::hours_at_risk(&window, 60, 0.2);
//! assert_eq!(hours, 10.0 / 60.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[macro_use]
mod macros;

pub mod analytics;
pub mod config;
pub mod constants;
pub mod errors;
pub mod report;
pub mod time;
pub mod traits;
pub mod window;

// Public API
pub use analytics::PriceSource;
pub use config::AnalyticsConfig;
pub use errors::{AnalyticsError, AnalyticsResult, WindowError};
pub use report::{KpiInputs, KpiReport, KpiReportBuilder, SystemHealth, SystemStatistics};
pub use time::{AnchorPolicy, FixedTime, TimeSource, Timestamp};
pub use window::{Reading, Window};

#[cfg(feature = "std")]
pub use time::SystemTime;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
