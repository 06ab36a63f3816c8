use std::collections::BTreeMap;
use std::io::Read;

use chrono::NaiveDate;
use ro_tax_core::{NewWorkDay, RepositoryError, WorkDayRepository};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading work day data.
#[derive(Debug, Error)]
pub enum WorkDayLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Row {row}: hours worked must be positive, got {value}")]
    InvalidHours { row: usize, value: Decimal },

    #[error("Row {row}: hourly rate must be positive, got {value}")]
    InvalidRate { row: usize, value: Decimal },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for WorkDayLoaderError {
    fn from(err: csv::Error) -> Self {
        WorkDayLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from a work days CSV file.
///
/// - `date`: calendar day, `YYYY-MM-DD`
/// - `hours_worked`: hours billed that day, positive
/// - `hourly_rate`: rate for those hours, positive
/// - `notes`: free text, optional column; empty cells read as `None`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkDayRecord {
    pub date: NaiveDate,
    pub hours_worked: Decimal,
    pub hourly_rate: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub notes: Option<String>,
}

impl From<&WorkDayRecord> for NewWorkDay {
    fn from(record: &WorkDayRecord) -> Self {
        NewWorkDay {
            date: record.date,
            hours_worked: record.hours_worked,
            hourly_rate: record.hourly_rate,
            notes: record.notes.clone(),
        }
    }
}

fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

/// Loader for work days from CSV files.
///
/// Records are written through the [`WorkDayRepository`] trait, so any
/// registered backend can be the target.
pub struct WorkDayLoader;

impl WorkDayLoader {
    /// Parse work day records from a CSV reader.
    ///
    /// Rows with non-positive hours or rate are rejected; the error carries
    /// the 1-based data row number (the header is not counted).
    pub fn parse<R: Read>(reader: R) -> Result<Vec<WorkDayRecord>, WorkDayLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for (index, result) in csv_reader.deserialize().enumerate() {
            let record: WorkDayRecord = result?;
            let row = index + 1;

            if record.hours_worked <= Decimal::ZERO {
                return Err(WorkDayLoaderError::InvalidHours {
                    row,
                    value: record.hours_worked,
                });
            }
            if record.hourly_rate <= Decimal::ZERO {
                return Err(WorkDayLoaderError::InvalidRate {
                    row,
                    value: record.hourly_rate,
                });
            }

            records.push(record);
        }

        Ok(records)
    }

    /// Load work day records into the repository.
    ///
    /// For each distinct date in the records, the stored work days on that
    /// date are replaced by the file's rows in one repository call, so a
    /// failed insert leaves that date as it was. Loading the same file twice
    /// leaves the store unchanged, and dates absent from the file are never
    /// touched.
    ///
    /// Dates are processed in order; dates replaced before a failure stay
    /// replaced.
    ///
    /// Returns the number of work days inserted.
    pub async fn load<R: WorkDayRepository + ?Sized>(
        repo: &R,
        records: &[WorkDayRecord],
    ) -> Result<usize, WorkDayLoaderError> {
        let mut inserted = 0;

        let mut by_date: BTreeMap<NaiveDate, Vec<NewWorkDay>> = BTreeMap::new();
        for record in records {
            by_date
                .entry(record.date)
                .or_default()
                .push(NewWorkDay::from(record));
        }

        for (date, work_days) in by_date {
            let count = work_days.len();
            let removed = repo.replace_work_days_on(date, work_days).await?;
            if removed > 0 {
                debug!(%date, removed, "replaced existing work days");
            }
            inserted += count;
        }

        Ok(inserted)
    }
}
