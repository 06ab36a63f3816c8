//! Plain-text reports.
//!
//! Amounts are shown rounded to two decimals; the JSON output carries the
//! exact values.

use std::fmt::Write;

use chrono::Month;
use ro_tax_core::calculations::common::{format_amount, format_rate};
use ro_tax_core::{IncomeSummary, TaxCalculationResult, WorkDay};
use rust_decimal::Decimal;

use crate::utils::opt_text_display;

const CURRENCY: &str = "RON";

fn line(
    out: &mut String,
    label: &str,
    amount: Decimal,
) {
    let _ = writeln!(out, "  {:<28}{:>16}", label, format_amount(amount));
}

pub fn render_calculation(
    result: &TaxCalculationResult,
    year: i32,
) -> String {
    let mut out = String::new();
    let breakdown = &result.breakdown;
    let rates = &result.tax_rates;

    let _ = writeln!(out, "TAX CALCULATION ({year}, amounts in {CURRENCY})");
    let _ = writeln!(out);

    let _ = writeln!(out, "INCOME");
    line(&mut out, "Gross income", result.gross_income);
    line(&mut out, "Total deductions", breakdown.total_deductions);
    line(&mut out, "Taxable income", result.taxable_income);
    let _ = writeln!(out);

    let _ = writeln!(out, "DEDUCTIONS");
    line(&mut out, "Personal", breakdown.personal_deduction);
    line(&mut out, "Professional", breakdown.professional_deductions);
    line(&mut out, "Health insurance", breakdown.health_insurance_deductions);
    line(&mut out, "Social insurance", breakdown.social_insurance_deductions);
    line(&mut out, "Voluntary pension", breakdown.voluntary_pension_deductions);
    let _ = writeln!(out);

    let _ = writeln!(out, "TAXES");
    line(
        &mut out,
        &format!("Income tax ({})", format_rate(rates.income_tax)),
        result.income_tax,
    );
    line(
        &mut out,
        &format!("Health insurance ({})", format_rate(rates.health_insurance)),
        result.health_insurance,
    );
    line(
        &mut out,
        &format!("Social insurance ({})", format_rate(rates.social_insurance)),
        result.social_insurance,
    );
    line(&mut out, "Total taxes", result.total_taxes);
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "NET INCOME: {} {CURRENCY}",
        format_amount(result.net_income)
    );
    out
}

pub fn render_gross_income(
    year: i32,
    gross_income: Decimal,
) -> String {
    format!(
        "Gross income for {year}: {} {CURRENCY}\n",
        format_amount(gross_income)
    )
}

pub fn render_summary(summary: &IncomeSummary) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "INCOME SUMMARY ({}, amounts in {CURRENCY})", summary.year);
    let _ = writeln!(out);
    line(&mut out, "Gross income", summary.gross_income);
    line(&mut out, "Hours worked", summary.total_hours);
    line(&mut out, "Average hourly rate", summary.average_hourly_rate);
    let _ = writeln!(out, "  {:<28}{:>16}", "Days worked", summary.days_worked);
    let _ = writeln!(out);

    let _ = writeln!(out, "  {:<12}{:>16}{:>16}", "Month", "Gross", "Hours");
    for month in &summary.monthly {
        let name = u8::try_from(month.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("?");
        let _ = writeln!(
            out,
            "  {:<12}{:>16}{:>16}",
            name,
            format_amount(month.gross_income),
            format_amount(month.hours)
        );
    }
    out
}

pub fn render_work_days(work_days: &[WorkDay]) -> String {
    if work_days.is_empty() {
        return "No work days recorded.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6}  {:<10}{:>10}{:>12}{:>14}  Notes",
        "ID", "Date", "Hours", "Rate", "Earnings"
    );
    for work_day in work_days {
        let _ = writeln!(
            out,
            "{:>6}  {:<10}{:>10}{:>12}{:>14}  {}",
            work_day.id,
            work_day.date.format("%Y-%m-%d").to_string(),
            format_amount(work_day.hours_worked),
            format_amount(work_day.hourly_rate),
            opt_amount_display(work_day.earning_record().checked_earnings()),
            opt_text_display(work_day.notes.as_deref())
        );
    }

    let total = work_days.iter().try_fold(Decimal::ZERO, |total, work_day| {
        total.checked_add(work_day.earning_record().checked_earnings()?)
    });
    let _ = writeln!(out, "Total earnings: {} {CURRENCY}", opt_amount_display(total));
    out
}

/// Amounts too large to represent are shown as a dash.
fn opt_amount_display(amount: Option<Decimal>) -> String {
    amount.map_or_else(|| opt_text_display(None).to_string(), format_amount)
}
