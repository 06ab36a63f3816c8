use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a rate table or rule book is malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxRatesError {
    #[error("income tax rate must be between 0 and 1, got {0}")]
    InvalidIncomeTaxRate(Decimal),

    #[error("health insurance rate must be between 0 and 1, got {0}")]
    InvalidHealthInsuranceRate(Decimal),

    #[error("social insurance rate must be between 0 and 1, got {0}")]
    InvalidSocialInsuranceRate(Decimal),

    #[error("personal deduction must be non-negative, got {0}")]
    InvalidPersonalDeduction(Decimal),

    #[error("social insurance ceiling must be positive, got {0}")]
    InvalidSocialInsuranceCeiling(Decimal),

    #[error("no rate table registered for default year {0}")]
    MissingDefaultYear(i32),
}

/// Statutory rates and limits for one tax year.
///
/// Values are immutable once built; a [`TaxRuleBook`] owns one of these per
/// registered year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRatesConfig {
    pub tax_year: i32,
    pub income_tax_rate: Decimal,
    pub health_insurance_rate: Decimal,
    pub social_insurance_rate: Decimal,
    pub personal_deduction_annual: Decimal,
    pub social_insurance_ceiling: Decimal,
}

impl TaxRatesConfig {
    /// The 2024 Romanian rule set.
    pub fn romania_2024() -> Self {
        Self {
            tax_year: 2024,
            income_tax_rate: dec!(0.10),
            health_insurance_rate: dec!(0.10),
            social_insurance_rate: dec!(0.25),
            personal_deduction_annual: dec!(3000),
            social_insurance_ceiling: dec!(132000),
        }
    }

    /// Checks every rate is a fraction in `[0, 1]`, the personal deduction is
    /// non-negative and the social insurance ceiling is positive.
    pub fn validate(&self) -> Result<(), TaxRatesError> {
        if !is_fraction(self.income_tax_rate) {
            return Err(TaxRatesError::InvalidIncomeTaxRate(self.income_tax_rate));
        }
        if !is_fraction(self.health_insurance_rate) {
            return Err(TaxRatesError::InvalidHealthInsuranceRate(
                self.health_insurance_rate,
            ));
        }
        if !is_fraction(self.social_insurance_rate) {
            return Err(TaxRatesError::InvalidSocialInsuranceRate(
                self.social_insurance_rate,
            ));
        }
        if self.personal_deduction_annual < Decimal::ZERO {
            return Err(TaxRatesError::InvalidPersonalDeduction(
                self.personal_deduction_annual,
            ));
        }
        if self.social_insurance_ceiling <= Decimal::ZERO {
            return Err(TaxRatesError::InvalidSocialInsuranceCeiling(
                self.social_insurance_ceiling,
            ));
        }
        Ok(())
    }
}

fn is_fraction(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate <= Decimal::ONE
}

/// Rate tables keyed by tax year, with a default used for every year that
/// has no table of its own.
///
/// The default book only knows the 2024 rules, so every year resolves to
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxRuleBook {
    tables: BTreeMap<i32, TaxRatesConfig>,
    default_year: i32,
}

impl TaxRuleBook {
    /// Builds a book from `tables`, falling back to the table for
    /// `default_year`. Later tables for the same year replace earlier ones.
    pub fn new(
        tables: impl IntoIterator<Item = TaxRatesConfig>,
        default_year: i32,
    ) -> Result<Self, TaxRatesError> {
        let mut by_year = BTreeMap::new();
        for table in tables {
            table.validate()?;
            by_year.insert(table.tax_year, table);
        }
        if !by_year.contains_key(&default_year) {
            return Err(TaxRatesError::MissingDefaultYear(default_year));
        }
        Ok(Self {
            tables: by_year,
            default_year,
        })
    }

    /// Returns a copy of this book with `table` registered for its year.
    pub fn with_table(
        &self,
        table: TaxRatesConfig,
    ) -> Result<Self, TaxRatesError> {
        table.validate()?;
        let mut tables = self.tables.clone();
        tables.insert(table.tax_year, table);
        Ok(Self {
            tables,
            default_year: self.default_year,
        })
    }

    /// The table registered for `year`, or the default table.
    pub fn rates_for(
        &self,
        year: i32,
    ) -> &TaxRatesConfig {
        self.tables
            .get(&year)
            .unwrap_or_else(|| &self.tables[&self.default_year])
    }

    pub fn default_year(&self) -> i32 {
        self.default_year
    }

    /// Years with a table of their own, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.tables.keys().copied().collect()
    }
}

impl Default for TaxRuleBook {
    fn default() -> Self {
        let table = TaxRatesConfig::romania_2024();
        Self {
            default_year: table.tax_year,
            tables: BTreeMap::from([(table.tax_year, table)]),
        }
    }
}
