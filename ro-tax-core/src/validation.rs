//! Input checks for tax calculation requests.
//!
//! The engine itself accepts any numbers; callers that take input from the
//! outside world run [`validate_input`] first and reject the request before
//! anything is computed.

use std::ops::RangeInclusive;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{DeductionSet, TaxCalculationInput};

/// Tax years accepted by [`validate_input`].
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 2020..=2030;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxInputError {
    #[error("tax year {year} is outside the supported range {min}-{max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },

    #[error("gross income must be non-negative, got {0}")]
    NegativeGrossIncome(Decimal),

    #[error("deduction '{field}' must be non-negative, got {value}")]
    NegativeDeduction { field: &'static str, value: Decimal },

    #[error("deductions add up to more than the largest representable amount")]
    DeductionsOutOfRange,
}

pub fn validate_year(year: i32) -> Result<(), TaxInputError> {
    if SUPPORTED_YEARS.contains(&year) {
        Ok(())
    } else {
        Err(TaxInputError::YearOutOfRange {
            year,
            min: *SUPPORTED_YEARS.start(),
            max: *SUPPORTED_YEARS.end(),
        })
    }
}

/// Checks the year, the gross income and every supplied deduction, in that
/// order, stopping at the first problem.
pub fn validate_input(input: &TaxCalculationInput) -> Result<(), TaxInputError> {
    validate_year(input.year)?;

    if input.gross_income < Decimal::ZERO {
        return Err(TaxInputError::NegativeGrossIncome(input.gross_income));
    }

    validate_deductions(&input.deductions)
}

/// Rejects the first supplied deduction that is negative, then a set whose
/// total does not fit in a [`Decimal`].
pub fn validate_deductions(deductions: &DeductionSet) -> Result<(), TaxInputError> {
    let present = deductions.present();

    if let Some(&(field, value)) = present.iter().find(|(_, value)| *value < Decimal::ZERO) {
        return Err(TaxInputError::NegativeDeduction { field, value });
    }

    present
        .iter()
        .try_fold(Decimal::ZERO, |total, (_, value)| total.checked_add(*value))
        .map(|_| ())
        .ok_or(TaxInputError::DeductionsOutOfRange)
}
