//! Domain types for Shelfscope
//!
//! - `book`: the per-title record read from the source database
//! - `stats`: grouped-count tables produced by the aggregator

mod book;
mod stats;

// Re-export all public types
pub use book::{BookRecord, DateField, UNKNOWN_PLACEHOLDER};
pub use stats::{Dimension, GroupEntry, GroupedCount};
