use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{EarningRecord, NewWorkDay, WorkDay};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// The narrow query the income aggregator needs.
#[async_trait]
pub trait EarningsRepository: Send + Sync {
    /// Every earning record dated between `start` and `end`, both inclusive.
    /// Order is unspecified.
    async fn find_earnings_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<EarningRecord>, RepositoryError>;
}

/// Full work-day storage, as used by the importer and the CLI.
#[async_trait]
pub trait WorkDayRepository: EarningsRepository {
    async fn create_work_day(
        &self,
        work_day: NewWorkDay,
    ) -> Result<WorkDay, RepositoryError>;

    async fn get_work_day(&self, id: i64) -> Result<WorkDay, RepositoryError>;

    async fn update_work_day(
        &self,
        work_day: &WorkDay,
    ) -> Result<(), RepositoryError>;

    async fn delete_work_day(&self, id: i64) -> Result<(), RepositoryError>;

    /// Atomically swaps every work day stored on `date` for `work_days`,
    /// returning how many stored rows were removed.
    ///
    /// Every entry of `work_days` must be dated `date`. On any failure the
    /// stored rows for `date` are left as they were.
    async fn replace_work_days_on(
        &self,
        date: NaiveDate,
        work_days: Vec<NewWorkDay>,
    ) -> Result<u64, RepositoryError>;

    /// Work days ordered by date then id, optionally limited to one calendar
    /// year.
    async fn list_work_days(
        &self,
        year: Option<i32>,
    ) -> Result<Vec<WorkDay>, RepositoryError>;
}
