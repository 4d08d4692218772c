//! Statistics Module
//!
//! The aggregation query layer behind the stats panels. Each `Statistic` is a fixed,
//! strongly typed pipeline; `run_all` executes them one after another and returns the
//! rows by value, in display order.

pub mod queries;
pub mod types;

pub use queries::run_all;
pub use types::{StatRow, Statistic};
