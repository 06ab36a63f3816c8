mod deduction_set;
mod earning_record;
mod income_summary;
mod tax_calculation;
mod tax_rates;
mod work_day;

pub use deduction_set::DeductionSet;
pub use earning_record::EarningRecord;
pub use income_summary::{IncomeSummary, MonthlyIncome};
pub use tax_calculation::{
    AppliedTaxRates, DeductionBreakdown, TaxCalculationInput, TaxCalculationResult,
};
pub use tax_rates::{TaxRatesConfig, TaxRatesError, TaxRuleBook};
pub use work_day::{NewWorkDay, WorkDay};
