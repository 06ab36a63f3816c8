//! Romanian personal income tax calculation.
//!
//! The crate has two entry points:
//!
//! * [`TaxEngine`] computes income tax, health insurance and social
//!   insurance for a known gross income.
//! * [`IncomeAggregator`] derives the gross income from work days held in an
//!   [`EarningsRepository`] and runs the engine on it.
//!
//! Storage backends live in separate crates and plug in through
//! [`RepositoryFactory`].

pub mod calculations;
pub mod db;
pub mod income;
pub mod models;
pub mod validation;

pub use calculations::TaxEngine;
pub use db::{
    DbConfig, EarningsRepository, RepositoryError, RepositoryFactory, RepositoryRegistry,
    WorkDayRepository,
};
pub use income::{AggregationError, IncomeAggregator};
pub use models::*;
pub use validation::{SUPPORTED_YEARS, TaxInputError};
