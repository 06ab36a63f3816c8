//! Tax calculations for Romanian personal income.
//!
//! [`TaxEngine`] turns a gross income and a [`DeductionSet`](crate::DeductionSet)
//! into income tax, health insurance and social insurance amounts.

pub mod common;
pub mod income_tax;

pub use income_tax::TaxEngine;
