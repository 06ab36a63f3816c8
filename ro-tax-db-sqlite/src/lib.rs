//! SQLite storage for work days.
//!
//! Register [`SqliteRepositoryFactory`] with a
//! [`RepositoryRegistry`](ro_tax_core::RepositoryRegistry) to make the
//! `"sqlite"` backend available.

mod decimal;
pub mod factory;
pub mod repository;

pub use factory::SqliteRepositoryFactory;
pub use repository::SqliteRepository;
