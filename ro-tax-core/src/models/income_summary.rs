use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Earnings and hours for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyIncome {
    /// 1 = January.
    pub month: u32,
    pub gross_income: Decimal,
    pub hours: Decimal,
}

/// Work-day statistics for a calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSummary {
    pub year: i32,
    pub gross_income: Decimal,
    pub total_hours: Decimal,
    /// Number of distinct dates with at least one record.
    pub days_worked: usize,
    /// Gross income divided by total hours; zero when nothing was worked.
    pub average_hourly_rate: Decimal,
    /// Always twelve entries, January first.
    pub monthly: Vec<MonthlyIncome>,
}
