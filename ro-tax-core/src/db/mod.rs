pub mod factory;
pub mod repository;

pub use factory::{DbConfig, RepositoryFactory, RepositoryRegistry};
pub use repository::{EarningsRepository, RepositoryError, WorkDayRepository};
