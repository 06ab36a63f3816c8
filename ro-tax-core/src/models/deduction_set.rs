use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The five independent deduction categories a taxpayer may claim.
///
/// Every field is optional. A missing `personal_deduction` is replaced by the
/// statutory default of the applied rule set; every other missing field
/// counts as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_deduction: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_deductions: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_insurance_deductions: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_insurance_deductions: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voluntary_pension_deductions: Option<Decimal>,
}

impl DeductionSet {
    /// Field name / value pairs for every deduction that is present, in
    /// declaration order. Names match the serialized (camelCase) form.
    pub fn present(&self) -> Vec<(&'static str, Decimal)> {
        [
            ("personalDeduction", self.personal_deduction),
            ("professionalDeductions", self.professional_deductions),
            ("healthInsuranceDeductions", self.health_insurance_deductions),
            ("socialInsuranceDeductions", self.social_insurance_deductions),
            ("voluntaryPensionDeductions", self.voluntary_pension_deductions),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }
}
