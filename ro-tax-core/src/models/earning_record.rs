use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A dated amount of paid work, as returned by an
/// [`EarningsRepository`](crate::EarningsRepository).
///
/// Repositories are expected to hand out positive `hours_worked` and
/// `hourly_rate` values; the aggregator only ever sums them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningRecord {
    pub date: NaiveDate,
    pub hours_worked: Decimal,
    pub hourly_rate: Decimal,
}

impl EarningRecord {
    /// Hours worked multiplied by the hourly rate, or `None` when the
    /// product does not fit in a [`Decimal`].
    pub fn checked_earnings(&self) -> Option<Decimal> {
        self.hours_worked.checked_mul(self.hourly_rate)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn earnings_multiplies_hours_by_rate() {
        let record = EarningRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
            hours_worked: dec!(7.5),
            hourly_rate: dec!(62.40),
        };

        assert_eq!(record.checked_earnings(), Some(dec!(468.000)));
    }

    #[test]
    fn checked_earnings_detects_overflow() {
        let record = EarningRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
            hours_worked: dec!(10),
            hourly_rate: Decimal::MAX,
        };

        assert_eq!(record.checked_earnings(), None);
    }
}
