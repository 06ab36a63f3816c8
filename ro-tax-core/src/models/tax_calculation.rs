use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DeductionSet;

/// Caller-facing request for a yearly tax calculation.
///
/// `has_health_card` and `is_urban_area` are part of the contract but are not
/// read by any rule yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCalculationInput {
    pub gross_income: Decimal,
    pub year: i32,
    #[serde(default)]
    pub deductions: DeductionSet,
    #[serde(default = "default_true")]
    pub has_health_card: bool,
    #[serde(default = "default_true")]
    pub is_urban_area: bool,
}

fn default_true() -> bool {
    true
}

impl TaxCalculationInput {
    pub fn new(
        gross_income: Decimal,
        year: i32,
    ) -> Self {
        Self {
            gross_income,
            year,
            deductions: DeductionSet::default(),
            has_health_card: true,
            is_urban_area: true,
        }
    }
}

/// Deductions as they were applied: personal deduction defaulted, every
/// other missing category shown as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionBreakdown {
    pub personal_deduction: Decimal,
    pub professional_deductions: Decimal,
    pub health_insurance_deductions: Decimal,
    pub social_insurance_deductions: Decimal,
    pub voluntary_pension_deductions: Decimal,
    pub total_deductions: Decimal,
}

/// The three contribution rates a calculation used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedTaxRates {
    pub income_tax: Decimal,
    pub health_insurance: Decimal,
    pub social_insurance: Decimal,
}

/// Full tax breakdown for one year. Always derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCalculationResult {
    pub gross_income: Decimal,
    pub taxable_income: Decimal,
    pub income_tax: Decimal,
    pub health_insurance: Decimal,
    pub social_insurance: Decimal,
    pub total_taxes: Decimal,
    /// Gross income minus total taxes. Not floored; negative when the
    /// contributions exceed the income.
    pub net_income: Decimal,
    pub breakdown: DeductionBreakdown,
    pub tax_rates: AppliedTaxRates,
}
