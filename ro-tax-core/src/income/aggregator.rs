//! Gross income from recorded work days.
//!
//! [`IncomeAggregator`] asks an [`EarningsRepository`] for every earning
//! record of a calendar year, reduces them to a gross total and, for the
//! derived calculation mode, feeds that total to a [`TaxEngine`].

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::calculations::TaxEngine;
use crate::db::{EarningsRepository, RepositoryError};
use crate::models::{
    DeductionSet, EarningRecord, IncomeSummary, MonthlyIncome, TaxCalculationResult,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("year {0} has no valid calendar bounds")]
    InvalidYear(i32),

    #[error("failed to fetch earnings: {0}")]
    Repository(#[from] RepositoryError),

    #[error("recorded earnings exceed the largest representable amount")]
    Overflow,
}

/// Sum of `hours_worked × hourly_rate` over `records`. Zero when empty.
///
/// # Errors
///
/// [`AggregationError::Overflow`] when a product or the running total does
/// not fit in a [`Decimal`].
pub fn sum_earnings(records: &[EarningRecord]) -> Result<Decimal, AggregationError> {
    records
        .iter()
        .try_fold(Decimal::ZERO, |total, record| {
            total.checked_add(record.checked_earnings()?)
        })
        .ok_or(AggregationError::Overflow)
}

/// January 1st and December 31st of `year`.
pub fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate), AggregationError> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = NaiveDate::from_ymd_opt(year, 12, 31);
    start.zip(end).ok_or(AggregationError::InvalidYear(year))
}

/// Derives gross income, and the taxes on it, from stored earnings.
///
/// Both collaborators are borrowed; the aggregator holds no state of its
/// own and may be rebuilt freely.
pub struct IncomeAggregator<'a, R: EarningsRepository + ?Sized> {
    repository: &'a R,
    engine: &'a TaxEngine,
}

impl<'a, R: EarningsRepository + ?Sized> IncomeAggregator<'a, R> {
    pub fn new(
        repository: &'a R,
        engine: &'a TaxEngine,
    ) -> Self {
        Self { repository, engine }
    }

    async fn earnings_for_year(
        &self,
        year: i32,
    ) -> Result<Vec<EarningRecord>, AggregationError> {
        let (start, end) = year_bounds(year)?;
        let records = self
            .repository
            .find_earnings_by_date_range(start, end)
            .await?;
        debug!(year, records = records.len(), "fetched earning records");
        Ok(records)
    }

    /// Total earnings dated within `year`.
    ///
    /// # Errors
    ///
    /// [`AggregationError::Repository`] when the fetch fails; no partial
    /// total is returned.
    pub async fn get_yearly_gross_income(
        &self,
        year: i32,
    ) -> Result<Decimal, AggregationError> {
        let records = self.earnings_for_year(year).await?;
        sum_earnings(&records)
    }

    /// Taxes on the gross income recorded for `year`.
    ///
    /// Missing deductions are treated as an empty set. The health card and
    /// urban area flags are passed as `true`; they do not affect the result.
    pub async fn calculate_taxes_from_work_days(
        &self,
        year: i32,
        deductions: Option<DeductionSet>,
    ) -> Result<TaxCalculationResult, AggregationError> {
        let gross_income = self.get_yearly_gross_income(year).await?;
        let deductions = deductions.unwrap_or_default();

        Ok(self
            .engine
            .calculate_yearly_taxes(gross_income, year, &deductions, true, true))
    }

    /// Yearly totals plus a per-month split of earnings and hours.
    pub async fn yearly_income_summary(
        &self,
        year: i32,
    ) -> Result<IncomeSummary, AggregationError> {
        let records = self.earnings_for_year(year).await?;

        let mut monthly: Vec<MonthlyIncome> = (1..=12)
            .map(|month| MonthlyIncome {
                month,
                gross_income: Decimal::ZERO,
                hours: Decimal::ZERO,
            })
            .collect();
        let mut dates = BTreeSet::new();

        for record in &records {
            let entry = &mut monthly[record.date.month0() as usize];
            entry.gross_income = record
                .checked_earnings()
                .and_then(|earnings| entry.gross_income.checked_add(earnings))
                .ok_or(AggregationError::Overflow)?;
            entry.hours = entry
                .hours
                .checked_add(record.hours_worked)
                .ok_or(AggregationError::Overflow)?;
            dates.insert(record.date);
        }

        let gross_income = sum_earnings(&records)?;
        let total_hours = monthly
            .iter()
            .try_fold(Decimal::ZERO, |total, month| total.checked_add(month.hours))
            .ok_or(AggregationError::Overflow)?;
        let average_hourly_rate = if total_hours.is_zero() {
            Decimal::ZERO
        } else {
            gross_income
                .checked_div(total_hours)
                .ok_or(AggregationError::Overflow)?
        };

        Ok(IncomeSummary {
            year,
            gross_income,
            total_hours,
            days_worked: dates.len(),
            average_hourly_rate,
            monthly,
        })
    }
}
