//! Analytics engine
//!
//! Statistics primitives, the date-range resolver and one aggregator per
//! domain. Aggregators take an explicit `today`; only the tool layer reads
//! the clock.

pub mod calendar;
pub mod consistency;
pub mod dashboard;
pub mod exercises;
pub mod goals;
pub mod range;
pub mod stats;
pub mod tasks;
pub mod weight;
pub mod workouts;

pub use calendar::{DayCount, WeekKey};
pub use range::{resolve, DateRange, RangeQuery, RangeToken};
pub use stats::{Streaks, Trend};
