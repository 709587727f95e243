//! Shared data model and error taxonomy for Shelfscope
//!
//! Every other crate in the workspace speaks in terms of the types defined
//! here: [`BookRecord`] rows coming out of the loader, [`GroupedCount`]
//! tables coming out of the aggregator, and [`AppError`] for failures.

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, ErrorSeverity, Result};
pub use types::{BookRecord, DateField, Dimension, GroupEntry, GroupedCount, UNKNOWN_PLACEHOLDER};
