//! Grouped-count tables

use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute a [`GroupedCount`] was grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Year,
    Month,
    Publisher,
    Author,
    Tag,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Year => write!(f, "year"),
            Dimension::Month => write!(f, "month"),
            Dimension::Publisher => write!(f, "publisher"),
            Dimension::Author => write!(f, "author"),
            Dimension::Tag => write!(f, "tag"),
        }
    }
}

/// One `(key, count)` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub key: String,
    pub count: usize,
}

impl GroupEntry {
    pub fn new(key: impl Into<String>, count: usize) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

/// Ordered `(key, count)` table summarising records by one attribute
///
/// Entry order is whatever the producing aggregation declared; this type
/// never reorders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedCount {
    pub dimension: Dimension,
    entries: Vec<GroupEntry>,
}

impl GroupedCount {
    pub fn new(dimension: Dimension, entries: Vec<GroupEntry>) -> Self {
        Self { dimension, entries }
    }

    /// Creates a table with no rows
    pub fn empty(dimension: Dimension) -> Self {
        Self::new(dimension, Vec::new())
    }

    pub fn entries(&self) -> &[GroupEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Largest single count, zero for an empty table
    pub fn max_count(&self) -> usize {
        self.entries.iter().map(|e| e.count).max().unwrap_or(0)
    }

    /// Returns the rows as borrowed pairs, mostly for assertions and printing
    pub fn pairs(&self) -> Vec<(&str, usize)> {
        self.entries
            .iter()
            .map(|e| (e.key.as_str(), e.count))
            .collect()
    }
}
