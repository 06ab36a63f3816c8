use async_trait::async_trait;
use ro_tax_core::db::{DbConfig, RepositoryFactory};
use ro_tax_core::{RepositoryError, WorkDayRepository};
use tracing::info;

use crate::repository::SqliteRepository;

/// Map a connection string to a sqlx URL.
///
/// `sqlite:` URLs pass through untouched; bare paths are opened read-write
/// and created when missing.
fn database_url(connection_string: &str) -> String {
    if connection_string.starts_with("sqlite:") {
        connection_string.to_string()
    } else {
        format!("sqlite:{}?mode=rwc", connection_string)
    }
}

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`ro_tax_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use ro_tax_core::db::RepositoryRegistry;
/// use ro_tax_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string`.
    ///
    /// Accepted connection-string values:
    /// * A bare file path, e.g. `"work_days.db"`. The file is created if it
    ///   does not exist.
    /// * `":memory:"`, an ephemeral in-memory database.
    /// * A full `sqlite:` URL.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn WorkDayRepository>, RepositoryError> {
        let repo = if config.connection_string == ":memory:" {
            SqliteRepository::in_memory().await
        } else {
            SqliteRepository::new(&database_url(&config.connection_string)).await
        }
        .map_err(|e| RepositoryError::Connection(format!("{:#}", e)))?;

        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{:#}", e)))?;

        info!(connection = %config.connection_string, "opened sqlite work day store");
        Ok(Box::new(repo))
    }
}
