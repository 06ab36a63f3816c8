use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use ro_tax_core::income::aggregator::year_bounds;
use ro_tax_core::{
    EarningRecord, EarningsRepository, NewWorkDay, RepositoryError, WorkDay, WorkDayRepository,
};
use sqlx::{
    Row,
    sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow},
};
use tracing::debug;

use crate::decimal::{decimal_to_text, get_decimal};

const WORK_DAY_COLUMNS: &str =
    "id, date, hours_worked, hourly_rate, notes, created_at, updated_at";

const INSERT_WORK_DAY: &str = "INSERT INTO work_days (
        date, hours_worked, hourly_rate, notes, created_at, updated_at
    ) VALUES (?, ?, ?, ?, ?, ?)";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    /// An in-memory database that lives as long as this repository.
    ///
    /// Every SQLite connection to `:memory:` opens its own database, so the
    /// pool is pinned to one connection that is never recycled.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn database_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn row_to_work_day(row: &SqliteRow) -> Result<WorkDay, RepositoryError> {
    Ok(WorkDay {
        id: row.try_get("id").map_err(database_error)?,
        date: row
            .try_get::<NaiveDate, _>("date")
            .map_err(|e| RepositoryError::Database(format!("Failed to get date: {}", e)))?,
        hours_worked: get_decimal(row, "hours_worked")?,
        hourly_rate: get_decimal(row, "hourly_rate")?,
        notes: row.try_get("notes").map_err(database_error)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {}", e)))?,
    })
}

fn row_to_earning_record(row: &SqliteRow) -> Result<EarningRecord, RepositoryError> {
    Ok(EarningRecord {
        date: row
            .try_get::<NaiveDate, _>("date")
            .map_err(|e| RepositoryError::Database(format!("Failed to get date: {}", e)))?,
        hours_worked: get_decimal(row, "hours_worked")?,
        hourly_rate: get_decimal(row, "hourly_rate")?,
    })
}

#[async_trait]
impl EarningsRepository for SqliteRepository {
    async fn find_earnings_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<EarningRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT date, hours_worked, hourly_rate
             FROM work_days
             WHERE date >= ? AND date <= ?",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        debug!(%start, %end, rows = rows.len(), "loaded earning records");
        rows.iter().map(row_to_earning_record).collect()
    }
}

#[async_trait]
impl WorkDayRepository for SqliteRepository {
    async fn create_work_day(
        &self,
        work_day: NewWorkDay,
    ) -> Result<WorkDay, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(INSERT_WORK_DAY)
            .bind(work_day.date)
            .bind(decimal_to_text(work_day.hours_worked))
            .bind(decimal_to_text(work_day.hourly_rate))
            .bind(work_day.notes)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        let id = result.last_insert_rowid();
        self.get_work_day(id).await
    }

    async fn get_work_day(
        &self,
        id: i64,
    ) -> Result<WorkDay, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM work_days WHERE id = ?",
            WORK_DAY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_work_day(&row)
    }

    async fn update_work_day(
        &self,
        work_day: &WorkDay,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE work_days SET
                date = ?, hours_worked = ?, hourly_rate = ?, notes = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(work_day.date)
        .bind(decimal_to_text(work_day.hours_worked))
        .bind(decimal_to_text(work_day.hourly_rate))
        .bind(work_day.notes.as_deref())
        .bind(now)
        .bind(work_day.id)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_work_day(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM work_days WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn replace_work_days_on(
        &self,
        date: NaiveDate,
        work_days: Vec<NewWorkDay>,
    ) -> Result<u64, RepositoryError> {
        if let Some(stray) = work_days.iter().find(|w| w.date != date) {
            return Err(RepositoryError::Database(format!(
                "work day dated {} cannot replace work days on {}",
                stray.date, date
            )));
        }

        let now = Utc::now();
        // Rolled back on drop unless committed.
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        let removed = sqlx::query("DELETE FROM work_days WHERE date = ?")
            .bind(date)
            .execute(&mut *tx)
            .await
            .map_err(database_error)?
            .rows_affected();

        for work_day in work_days {
            sqlx::query(INSERT_WORK_DAY)
                .bind(work_day.date)
                .bind(decimal_to_text(work_day.hours_worked))
                .bind(decimal_to_text(work_day.hourly_rate))
                .bind(work_day.notes)
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(database_error)?;
        }

        tx.commit().await.map_err(database_error)?;

        debug!(%date, removed, "replaced work days");
        Ok(removed)
    }

    async fn list_work_days(
        &self,
        year: Option<i32>,
    ) -> Result<Vec<WorkDay>, RepositoryError> {
        let base_query = format!("SELECT {} FROM work_days", WORK_DAY_COLUMNS);

        let rows = match year {
            Some(year) => {
                let (start, end) = year_bounds(year).map_err(|e| {
                    RepositoryError::Database(e.to_string())
                })?;
                sqlx::query(&format!(
                    "{} WHERE date >= ? AND date <= ? ORDER BY date, id",
                    base_query
                ))
                .bind(start)
                .bind(end)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!("{} ORDER BY date, id", base_query))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(database_error)?;

        rows.iter().map(row_to_work_day).collect()
    }
}
