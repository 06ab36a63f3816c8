//! Numeric helpers shared by the calculations and the report output.
//!
//! The engine keeps full precision; rounding to bani only happens when an
//! amount is shown to a person.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds an amount to two decimal places (bani), half away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use ro_tax_core::calculations::common::round_money;
///
/// assert_eq!(round_money(dec!(9700.004)), dec!(9700.00));
/// assert_eq!(round_money(dec!(9700.005)), dec!(9700.01));
/// assert_eq!(round_money(dec!(-12.345)), dec!(-12.35));
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `value`, or zero when `value` is negative.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use ro_tax_core::calculations::common::clamp_non_negative;
///
/// assert_eq!(clamp_non_negative(dec!(-1000)), dec!(0));
/// assert_eq!(clamp_non_negative(dec!(97000)), dec!(97000));
/// ```
pub fn clamp_non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Formats an amount with two decimals and `,` thousands separators,
/// e.g. `44,700.00` or `-1,250.50`.
pub fn format_amount(value: Decimal) -> String {
    let rounded = round_money(value);
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

/// Formats a fractional rate as a percentage, e.g. `0.25` as `25%`.
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}
