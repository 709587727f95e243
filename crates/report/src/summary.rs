//! Library-wide statistics

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shelfscope_core::BookRecord;
use std::collections::BTreeSet;

/// Headline numbers printed before the per-attribute tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySummary {
    pub total_books: usize,
    /// Rows whose metadata could not be read at all
    pub unreadable_count: usize,
    pub with_purchase_date: usize,
    pub with_publication_date: usize,
    pub authors_count: usize,
    pub publishers_count: usize,
    pub tags_count: usize,
    pub first_purchase: Option<NaiveDate>,
    pub last_purchase: Option<NaiveDate>,
}

impl LibrarySummary {
    /// Creates empty statistics
    pub fn empty() -> Self {
        Self::from_records(&[])
    }

    pub fn from_records(records: &[BookRecord]) -> Self {
        let distinct = |f: fn(&BookRecord) -> Option<&str>| -> usize {
            records.iter().filter_map(f).collect::<BTreeSet<_>>().len()
        };
        let purchases = records.iter().filter_map(|r| r.purchase_date);

        Self {
            total_books: records.len(),
            unreadable_count: records.iter().filter(|r| r.is_blank()).count(),
            with_purchase_date: records.iter().filter(|r| r.purchase_date.is_some()).count(),
            with_publication_date: records
                .iter()
                .filter(|r| r.publication_date.is_some())
                .count(),
            authors_count: distinct(|r| r.author.as_deref()),
            publishers_count: distinct(|r| r.publisher.as_deref()),
            tags_count: distinct(|r| r.content_tag.as_deref()),
            first_purchase: purchases.clone().min(),
            last_purchase: purchases.max(),
        }
    }

    /// Returns the percentage of books with a known purchase date
    pub fn dated_percentage(&self) -> f64 {
        if self.total_books == 0 {
            return 0.0;
        }
        (self.with_purchase_date as f64 / self.total_books as f64) * 100.0
    }

    pub fn is_empty(&self) -> bool {
        self.total_books == 0
    }
}

impl Default for LibrarySummary {
    fn default() -> Self {
        Self::empty()
    }
}
