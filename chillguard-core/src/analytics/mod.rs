//! Time-Windowed Cold-Chain Analytics
//!
//! ## Overview
//!
//! Four calculators turn one sensor's [`Window`](crate::window::Window) into
//! the numbers a chamber report needs:
//!
//! | Calculator        | Question answered                                   | Anchor      |
//! |-------------------|-----------------------------------------------------|-------------|
//! | [`rate`]          | How fast is the chamber warming or cooling?         | wall clock  |
//! | [`risk`]          | How long was the product above its threshold?       | event time  |
//! | [`reliability`]   | What fraction of expected samples actually arrived? | wall clock  |
//! | [`cost`]          | What is that exposure worth at market prices?       | n/a         |
//!
//! `rate`, `risk` and `reliability` read the window independently; `cost`
//! consumes the output of `risk`.
//!
//! ## Numeric Floors
//!
//! None of the calculators fail. Too little data is a well-defined answer:
//! - Fewer than two readings: rate `0.0`, exposure `0.0`
//! - Zero elapsed time: rate `0.0`
//! - Zero expected samples: uptime `0.0`
//!
//! Every division is guarded before it happens, so no NaN or infinity can
//! reach a report.
//!
//! ## Interval Attribution
//!
//! Exposure is attributed forward: the temperature sampled at reading *i*
//! is assumed to hold until reading *i + 1* arrives.
//!
//! ```text
//!  temp
//!   ^        i=1 (9.0)
//!   |        ●━━━━━━━━━┓           threshold 8.0
//!   |- - - - - - - - - ┃- - - - - - - - - - - -
//!   |  ●━━━━━┛         ●━━━━━━━━━━━━━━━━●
//!   |  i=0 (4.0)       i=2 (5.0)        i=3 (last: no interval)
//!   +---------------------------------------------> t
//!         [ 0 , 5 )  [ 5 , 10 ) [ 10 ,        30 )
//!           safe      critical     safe
//! ```
//!
//! A gap at or above the cap (12 minutes by default) is treated as a sensor
//! outage and never counts as exposure, whatever the temperature.
//!
//! ## Usage Example
//!
//! ```rust
//! use chillguard_core::analytics::{rate, risk, reliability, cost};
//! use chillguard_core::{Reading, Window};
//!
//! let window = Window::new(vec![
//!     Reading::new(0, 9.0, 8.0),
//!     Reading::new(600_000, 10.0, 8.0),
//! ])?;
//!
//! let slope = rate::rate_of_change(&window, 30);
//! let hours = risk::hours_at_risk(&window, 60, 0.2);
//! let uptime = reliability::uptime(window.len(), 1, 12);
//! let price = cost::PriceSource::Live(30.0);
//! let loss = cost::estimated_cost(hours, price.value(), 200.0, 4.0);
//!
//! assert_eq!(slope, 0.1);
//! assert_eq!(hours, 10.0 / 60.0);
//! assert_eq!(uptime, 16.67);
//! assert!(loss > 0.0);
//! # Ok::<(), chillguard_core::WindowError>(())
//! ```

pub mod cost;
pub mod rate;
pub mod reliability;
pub mod risk;

pub use cost::{estimated_cost, risk_factor, PriceSource};
pub use rate::{instant_rates, rate_of_change, rate_of_change_at};
pub use reliability::{count_since, uptime};
pub use risk::{hours_at_risk, risk_intervals, RiskInterval};
