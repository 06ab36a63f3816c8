//! CSV import of work days.

pub mod loader;

pub use loader::{WorkDayLoader, WorkDayLoaderError, WorkDayRecord};
