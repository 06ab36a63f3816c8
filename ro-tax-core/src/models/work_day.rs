use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::EarningRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDay {
    pub id: i64,
    pub date: NaiveDate,
    pub hours_worked: Decimal,
    pub hourly_rate: Decimal,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkDay {
    /// The part of a work day that counts towards gross income.
    pub fn earning_record(&self) -> EarningRecord {
        EarningRecord {
            date: self.date,
            hours_worked: self.hours_worked,
            hourly_rate: self.hourly_rate,
        }
    }
}

/// For creating new work days (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWorkDay {
    pub date: NaiveDate,
    pub hours_worked: Decimal,
    pub hourly_rate: Decimal,
    pub notes: Option<String>,
}
