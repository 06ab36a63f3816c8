//! Income derived from stored work days.

pub mod aggregator;

pub use aggregator::{AggregationError, IncomeAggregator, sum_earnings};
