//! Yearly personal income tax under the Romanian rule set.
//!
//! # Calculation Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Personal deduction (statutory default when not supplied) |
//! | 2    | Total deductions: personal + professional + health + social + pension |
//! | 3    | Taxable income: gross − total deductions, never below zero |
//! | 4    | Income tax: taxable income × income tax rate |
//! | 5    | Health insurance: **gross** income × health insurance rate |
//! | 6    | Social insurance base: smaller of gross income or the ceiling |
//! | 7    | Social insurance: base × social insurance rate |
//! | 8    | Total taxes: step 4 + step 5 + step 7 |
//! | 9    | Net income: gross − total taxes (may be negative) |
//!
//! All arithmetic is exact; nothing is rounded. Sums beyond the `Decimal`
//! range saturate at its bounds instead of panicking.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use ro_tax_core::DeductionSet;
//! use ro_tax_core::calculations::TaxEngine;
//!
//! let engine = TaxEngine::default();
//! let result = engine.calculate_yearly_taxes(
//!     dec!(100000),
//!     2024,
//!     &DeductionSet::default(),
//!     true,
//!     true,
//! );
//!
//! assert_eq!(result.taxable_income, dec!(97000));
//! assert_eq!(result.total_taxes, dec!(44700));
//! assert_eq!(result.net_income, dec!(55300));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::clamp_non_negative;
use crate::models::{
    AppliedTaxRates, DeductionBreakdown, DeductionSet, TaxCalculationInput, TaxCalculationResult,
    TaxRatesConfig, TaxRuleBook,
};
use crate::validation::{TaxInputError, validate_input};

/// Calculator for yearly income tax and social contributions.
///
/// Holds an immutable [`TaxRuleBook`]; every calculation looks up the rate
/// table for the requested year in it.
#[derive(Debug, Clone, Default)]
pub struct TaxEngine {
    rules: TaxRuleBook,
}

impl TaxEngine {
    pub fn new(rules: TaxRuleBook) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &TaxRuleBook {
        &self.rules
    }

    /// Validates `input` and calculates its tax breakdown.
    ///
    /// # Errors
    ///
    /// Returns [`TaxInputError`] for an unsupported year, a negative gross
    /// income or a negative deduction. Nothing is computed in that case.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use ro_tax_core::{TaxCalculationInput, TaxInputError};
    /// use ro_tax_core::calculations::TaxEngine;
    ///
    /// let engine = TaxEngine::default();
    ///
    /// let err = engine
    ///     .calculate(&TaxCalculationInput::new(dec!(-1), 2024))
    ///     .unwrap_err();
    /// assert_eq!(err, TaxInputError::NegativeGrossIncome(dec!(-1)));
    /// ```
    pub fn calculate(
        &self,
        input: &TaxCalculationInput,
    ) -> Result<TaxCalculationResult, TaxInputError> {
        validate_input(input)?;

        Ok(self.calculate_yearly_taxes(
            input.gross_income,
            input.year,
            &input.deductions,
            input.has_health_card,
            input.is_urban_area,
        ))
    }

    /// Calculates the full tax breakdown for `gross_income` earned in `year`.
    ///
    /// Input is assumed to be valid; see [`TaxEngine::calculate`] for the
    /// checked variant. `has_health_card` and `is_urban_area` do not change
    /// the result.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use ro_tax_core::DeductionSet;
    /// use ro_tax_core::calculations::TaxEngine;
    ///
    /// let engine = TaxEngine::default();
    ///
    /// // Above the ceiling: social insurance is capped, health insurance is not.
    /// let result = engine.calculate_yearly_taxes(
    ///     dec!(200000),
    ///     2024,
    ///     &DeductionSet::default(),
    ///     true,
    ///     true,
    /// );
    ///
    /// assert_eq!(result.social_insurance, dec!(33000));
    /// assert_eq!(result.health_insurance, dec!(20000));
    /// ```
    pub fn calculate_yearly_taxes(
        &self,
        gross_income: Decimal,
        year: i32,
        deductions: &DeductionSet,
        _has_health_card: bool,
        _is_urban_area: bool,
    ) -> TaxCalculationResult {
        let rates = self.rules.rates_for(year);
        if rates.tax_year != year {
            debug!(
                requested_year = year,
                applied_year = rates.tax_year,
                "no rate table for requested year; using default"
            );
        }

        // Steps 1-2
        let breakdown = self.deduction_breakdown(rates, deductions);

        // Step 3
        let taxable_income = self.taxable_income(gross_income, breakdown.total_deductions);

        // Step 4
        let income_tax = taxable_income * rates.income_tax_rate;

        // Step 5
        let health_insurance = gross_income * rates.health_insurance_rate;

        // Steps 6-7
        let social_insurance = self.social_insurance(rates, gross_income);

        // Step 8
        let total_taxes = income_tax
            .saturating_add(health_insurance)
            .saturating_add(social_insurance);

        // Step 9
        let net_income = gross_income.saturating_sub(total_taxes);
        if net_income < Decimal::ZERO {
            debug!(
                gross_income = %gross_income,
                total_taxes = %total_taxes,
                "contributions exceed gross income; net income is negative"
            );
        }

        TaxCalculationResult {
            gross_income,
            taxable_income,
            income_tax,
            health_insurance,
            social_insurance,
            total_taxes,
            net_income,
            breakdown,
            tax_rates: AppliedTaxRates {
                income_tax: rates.income_tax_rate,
                health_insurance: rates.health_insurance_rate,
                social_insurance: rates.social_insurance_rate,
            },
        }
    }

    /// Resolves every deduction category and sums them.
    fn deduction_breakdown(
        &self,
        rates: &TaxRatesConfig,
        deductions: &DeductionSet,
    ) -> DeductionBreakdown {
        let personal_deduction = deductions
            .personal_deduction
            .unwrap_or(rates.personal_deduction_annual);
        let professional_deductions = deductions.professional_deductions.unwrap_or_default();
        let health_insurance_deductions =
            deductions.health_insurance_deductions.unwrap_or_default();
        let social_insurance_deductions =
            deductions.social_insurance_deductions.unwrap_or_default();
        let voluntary_pension_deductions =
            deductions.voluntary_pension_deductions.unwrap_or_default();

        // Saturates instead of overflowing; a saturated total still clamps
        // taxable income to zero.
        let total_deductions = [
            professional_deductions,
            health_insurance_deductions,
            social_insurance_deductions,
            voluntary_pension_deductions,
        ]
        .into_iter()
        .fold(personal_deduction, Decimal::saturating_add);

        DeductionBreakdown {
            personal_deduction,
            professional_deductions,
            health_insurance_deductions,
            social_insurance_deductions,
            voluntary_pension_deductions,
            total_deductions,
        }
    }

    /// Gross income minus deductions, clamped at zero.
    fn taxable_income(
        &self,
        gross_income: Decimal,
        total_deductions: Decimal,
    ) -> Decimal {
        let taxable = gross_income.saturating_sub(total_deductions);
        if taxable < Decimal::ZERO {
            debug!(
                gross_income = %gross_income,
                total_deductions = %total_deductions,
                "deductions exceed gross income; taxable income is zero"
            );
        }
        clamp_non_negative(taxable)
    }

    /// Social insurance on income up to the ceiling.
    fn social_insurance(
        &self,
        rates: &TaxRatesConfig,
        gross_income: Decimal,
    ) -> Decimal {
        let base = gross_income.min(rates.social_insurance_ceiling);
        base * rates.social_insurance_rate
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::*;

    fn engine() -> TaxEngine {
        TaxEngine::default()
    }

    fn calculate(
        gross_income: Decimal,
        deductions: &DeductionSet,
    ) -> TaxCalculationResult {
        engine().calculate_yearly_taxes(gross_income, 2024, deductions, true, true)
    }

    /// Initializes tracing subscriber for tests that go through log paths.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_span_events(FmtSpan::NONE)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    // =========================================================================
    // Worked scenarios
    // =========================================================================

    #[test]
    fn standard_income_without_deductions() {
        let result = calculate(dec!(100000), &DeductionSet::default());

        assert_eq!(result.gross_income, dec!(100000));
        assert_eq!(result.taxable_income, dec!(97000));
        assert_eq!(result.income_tax, dec!(9700));
        assert_eq!(result.health_insurance, dec!(10000));
        assert_eq!(result.social_insurance, dec!(25000));
        assert_eq!(result.total_taxes, dec!(44700));
        assert_eq!(result.net_income, dec!(55300));
    }

    #[test]
    fn custom_personal_deduction_replaces_default() {
        let deductions = DeductionSet {
            personal_deduction: Some(dec!(5000)),
            ..Default::default()
        };

        let result = calculate(dec!(50000), &deductions);

        assert_eq!(result.taxable_income, dec!(45000));
        assert_eq!(result.income_tax, dec!(4500));
        assert_eq!(result.breakdown.personal_deduction, dec!(5000));
        assert_eq!(result.breakdown.total_deductions, dec!(5000));
    }

    #[test]
    fn social_insurance_is_capped_at_ceiling() {
        let result = calculate(dec!(200000), &DeductionSet::default());

        assert_eq!(result.social_insurance, dec!(33000));
        assert_eq!(result.health_insurance, dec!(20000));
    }

    #[test]
    fn income_at_ceiling_uses_full_income() {
        let result = calculate(dec!(132000), &DeductionSet::default());

        assert_eq!(result.social_insurance, dec!(33000));
    }

    #[test]
    fn income_below_personal_deduction_has_no_income_tax() {
        let _guard = init_test_tracing();

        let result = calculate(dec!(2000), &DeductionSet::default());

        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.income_tax, dec!(0));
        assert_eq!(result.health_insurance, dec!(200));
        assert_eq!(result.social_insurance, dec!(500));
        assert_eq!(result.total_taxes, dec!(700));
        assert_eq!(result.net_income, dec!(1300));
    }

    #[test]
    fn all_deduction_categories_are_summed() {
        let deductions = DeductionSet {
            personal_deduction: Some(dec!(3000)),
            professional_deductions: Some(dec!(15000)),
            health_insurance_deductions: Some(dec!(2000)),
            social_insurance_deductions: Some(dec!(5000)),
            voluntary_pension_deductions: Some(dec!(3000)),
        };

        let result = calculate(dec!(120000), &deductions);

        assert_eq!(
            result.breakdown,
            DeductionBreakdown {
                personal_deduction: dec!(3000),
                professional_deductions: dec!(15000),
                health_insurance_deductions: dec!(2000),
                social_insurance_deductions: dec!(5000),
                voluntary_pension_deductions: dec!(3000),
                total_deductions: dec!(28000),
            }
        );
        assert_eq!(result.taxable_income, dec!(92000));
        assert_eq!(result.income_tax, dec!(9200));
    }

    // =========================================================================
    // Properties
    // =========================================================================

    #[test]
    fn zero_income_produces_all_zero_taxes() {
        let result = calculate(Decimal::ZERO, &DeductionSet::default());

        assert_eq!(result.taxable_income, Decimal::ZERO);
        assert_eq!(result.total_taxes, Decimal::ZERO);
        assert_eq!(result.net_income, Decimal::ZERO);
        assert_eq!(result.breakdown.total_deductions, dec!(3000));
    }

    #[test]
    fn empty_deductions_follow_closed_form() {
        for gross in [dec!(0), dec!(2999.99), dec!(3000), dec!(45678.91), dec!(131999.5), dec!(1000000)] {
            let result = calculate(gross, &DeductionSet::default());

            let expected_taxable = clamp_non_negative(gross - dec!(3000));
            assert_eq!(result.taxable_income, expected_taxable, "gross {gross}");
            assert_eq!(result.income_tax, expected_taxable * dec!(0.10), "gross {gross}");
            assert_eq!(result.health_insurance, gross * dec!(0.10), "gross {gross}");
            assert_eq!(
                result.social_insurance,
                gross.min(dec!(132000)) * dec!(0.25),
                "gross {gross}"
            );
        }
    }

    #[test]
    fn totals_add_up_exactly() {
        let deductions = DeductionSet {
            professional_deductions: Some(dec!(1234.567)),
            ..Default::default()
        };

        let result = calculate(dec!(87654.321), &deductions);

        assert_eq!(
            result.total_taxes,
            result.income_tax + result.health_insurance + result.social_insurance
        );
        assert_eq!(result.net_income, result.gross_income - result.total_taxes);
    }

    #[test]
    fn net_income_is_not_clamped() {
        let _guard = init_test_tracing();
        let heavy = TaxRatesConfig {
            health_insurance_rate: dec!(0.60),
            social_insurance_rate: dec!(0.60),
            ..TaxRatesConfig::romania_2024()
        };
        let engine = TaxEngine::new(TaxRuleBook::new([heavy], 2024).unwrap());

        let result =
            engine.calculate_yearly_taxes(dec!(1000), 2024, &DeductionSet::default(), true, true);

        assert_eq!(result.total_taxes, dec!(1200));
        assert_eq!(result.net_income, dec!(-200));
    }

    #[test]
    fn deductions_do_not_reduce_health_insurance() {
        let deductions = DeductionSet {
            professional_deductions: Some(dec!(40000)),
            ..Default::default()
        };

        let result = calculate(dec!(60000), &deductions);

        assert_eq!(result.health_insurance, dec!(6000));
        assert_eq!(result.taxable_income, dec!(17000));
    }

    #[test]
    fn deductions_larger_than_income_floor_taxable_at_zero() {
        let deductions = DeductionSet {
            professional_deductions: Some(dec!(90000)),
            ..Default::default()
        };

        let result = calculate(dec!(50000), &deductions);

        assert_eq!(result.taxable_income, Decimal::ZERO);
        assert_eq!(result.income_tax, Decimal::ZERO);
        assert_eq!(result.breakdown.total_deductions, dec!(93000));
    }

    #[test]
    fn zero_personal_deduction_is_respected() {
        let deductions = DeductionSet {
            personal_deduction: Some(Decimal::ZERO),
            ..Default::default()
        };

        let result = calculate(dec!(10000), &deductions);

        assert_eq!(result.taxable_income, dec!(10000));
    }

    #[test]
    fn flags_do_not_change_result() {
        let deductions = DeductionSet {
            professional_deductions: Some(dec!(500)),
            ..Default::default()
        };
        let engine = engine();

        let baseline = engine.calculate_yearly_taxes(dec!(75000), 2024, &deductions, true, true);
        for (card, urban) in [(false, true), (true, false), (false, false)] {
            let result = engine.calculate_yearly_taxes(dec!(75000), 2024, &deductions, card, urban);
            assert_eq!(result, baseline, "has_health_card={card} is_urban_area={urban}");
        }
    }

    #[test]
    fn repeated_calls_are_identical() {
        let engine = engine();
        let deductions = DeductionSet {
            voluntary_pension_deductions: Some(dec!(400)),
            ..Default::default()
        };

        let first = engine.calculate_yearly_taxes(dec!(64000), 2025, &deductions, true, true);
        let second = engine.calculate_yearly_taxes(dec!(64000), 2025, &deductions, true, true);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn every_year_uses_embedded_rules_by_default() {
        let _guard = init_test_tracing();
        let engine = engine();

        let in_2024 = engine.calculate_yearly_taxes(dec!(90000), 2024, &DeductionSet::default(), true, true);
        let in_2029 = engine.calculate_yearly_taxes(dec!(90000), 2029, &DeductionSet::default(), true, true);

        assert_eq!(in_2024, in_2029);
    }

    #[test]
    fn registered_year_uses_its_own_table() {
        let rates_2025 = TaxRatesConfig {
            tax_year: 2025,
            personal_deduction_annual: dec!(4000),
            social_insurance_ceiling: dec!(150000),
            ..TaxRatesConfig::romania_2024()
        };
        let engine = TaxEngine::new(TaxRuleBook::default().with_table(rates_2025).unwrap());

        let result =
            engine.calculate_yearly_taxes(dec!(200000), 2025, &DeductionSet::default(), true, true);

        assert_eq!(result.breakdown.personal_deduction, dec!(4000));
        assert_eq!(result.social_insurance, dec!(37500));
    }

    #[test]
    fn tax_rates_are_echoed() {
        let result = calculate(dec!(1), &DeductionSet::default());

        assert_eq!(
            result.tax_rates,
            AppliedTaxRates {
                income_tax: dec!(0.10),
                health_insurance: dec!(0.10),
                social_insurance: dec!(0.25),
            }
        );
    }

    #[test]
    fn missing_deductions_are_echoed_as_zero() {
        let result = calculate(dec!(30000), &DeductionSet::default());

        assert_eq!(result.breakdown.personal_deduction, dec!(3000));
        assert_eq!(result.breakdown.professional_deductions, Decimal::ZERO);
        assert_eq!(result.breakdown.health_insurance_deductions, Decimal::ZERO);
        assert_eq!(result.breakdown.social_insurance_deductions, Decimal::ZERO);
        assert_eq!(result.breakdown.voluntary_pension_deductions, Decimal::ZERO);
    }

    // =========================================================================
    // calculate (validated entry point)
    // =========================================================================

    #[test]
    fn calculate_matches_unchecked_variant_for_valid_input() {
        let input = TaxCalculationInput {
            deductions: DeductionSet {
                personal_deduction: Some(dec!(5000)),
                ..Default::default()
            },
            ..TaxCalculationInput::new(dec!(50000), 2024)
        };

        let checked = engine().calculate(&input).unwrap();

        assert_eq!(checked, calculate(dec!(50000), &input.deductions));
    }

    #[test]
    fn calculate_rejects_unsupported_year() {
        let input = TaxCalculationInput::new(dec!(50000), 2035);

        assert!(matches!(
            engine().calculate(&input),
            Err(TaxInputError::YearOutOfRange { year: 2035, .. })
        ));
    }

    #[test]
    fn calculate_rejects_negative_deduction() {
        let input = TaxCalculationInput {
            deductions: DeductionSet {
                voluntary_pension_deductions: Some(dec!(-400)),
                ..Default::default()
            },
            ..TaxCalculationInput::new(dec!(50000), 2024)
        };

        assert_eq!(
            engine().calculate(&input),
            Err(TaxInputError::NegativeDeduction {
                field: "voluntaryPensionDeductions",
                value: dec!(-400),
            })
        );
    }

    #[test]
    fn deduction_total_beyond_decimal_range_saturates() {
        let deductions = DeductionSet {
            professional_deductions: Some(Decimal::MAX),
            ..Default::default()
        };

        let result = calculate(dec!(100000), &deductions);

        assert_eq!(result.breakdown.total_deductions, Decimal::MAX);
        assert_eq!(result.taxable_income, Decimal::ZERO);
        assert_eq!(result.income_tax, Decimal::ZERO);
        assert_eq!(result.total_taxes, dec!(35000));
        assert_eq!(result.net_income, dec!(65000));
    }

    #[test]
    fn calculate_rejects_deductions_beyond_decimal_range() {
        let input = TaxCalculationInput {
            deductions: DeductionSet {
                professional_deductions: Some(Decimal::MAX),
                health_insurance_deductions: Some(dec!(1)),
                ..Default::default()
            },
            ..TaxCalculationInput::new(dec!(100000), 2024)
        };

        assert_eq!(
            engine().calculate(&input),
            Err(TaxInputError::DeductionsOutOfRange)
        );
    }

    #[test]
    fn engine_exposes_its_rule_book() {
        let rules = TaxRuleBook::default();

        let engine = TaxEngine::new(rules.clone());

        assert_eq!(engine.rules(), &rules);
        assert_eq!(engine.rules().default_year(), 2024);
    }
}
