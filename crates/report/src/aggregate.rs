//! Grouped counts over book records
//!
//! Every function here is pure: the same records always give the same table.
//! Records missing the grouped attribute are left out of that table only.
//!
//! Ordering:
//! - year and month tables are chronological, oldest first
//! - publisher, author and tag tables are by count descending, then by key

use chrono::Datelike;
use shelfscope_core::{BookRecord, DateField, Dimension, GroupEntry, GroupedCount};
use std::collections::BTreeMap;

/// Default length of the publisher and author rankings
pub const DEFAULT_TOP_N: usize = 10;

/// Counts books per purchase year
pub fn count_by_year(records: &[BookRecord]) -> GroupedCount {
    count_by_year_of(records, DateField::Purchase)
}

/// Counts books per year of the given date attribute
pub fn count_by_year_of(records: &[BookRecord], field: DateField) -> GroupedCount {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for date in records.iter().filter_map(|r| r.date(field)) {
        *counts.entry(date.year()).or_insert(0) += 1;
    }

    let entries = counts
        .into_iter()
        .map(|(year, count)| GroupEntry::new(format!("{:04}", year), count))
        .collect();
    GroupedCount::new(Dimension::Year, entries)
}

/// Counts books per purchase month, keyed `YYYY-MM`
///
/// Only months with at least one purchase appear.
pub fn count_by_month(records: &[BookRecord]) -> GroupedCount {
    let mut counts: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for date in records.iter().filter_map(|r| r.purchase_date) {
        *counts.entry((date.year(), date.month())).or_insert(0) += 1;
    }

    let entries = counts
        .into_iter()
        .map(|((year, month), count)| GroupEntry::new(format!("{:04}-{:02}", year, month), count))
        .collect();
    GroupedCount::new(Dimension::Month, entries)
}

/// Ranks publishers by number of books, keeping at most `top_n`
pub fn count_by_publisher(records: &[BookRecord], top_n: Option<usize>) -> GroupedCount {
    ranked(
        Dimension::Publisher,
        records.iter().filter_map(|r| r.publisher.as_deref()),
        top_n,
    )
}

/// Ranks authors by number of books, keeping at most `top_n`
///
/// Co-authored books count once under their joined author string.
pub fn count_by_author(records: &[BookRecord], top_n: Option<usize>) -> GroupedCount {
    ranked(
        Dimension::Author,
        records.iter().filter_map(|r| r.author.as_deref()),
        top_n,
    )
}

/// Counts books per content tag
pub fn count_by_tag(records: &[BookRecord]) -> GroupedCount {
    ranked(
        Dimension::Tag,
        records.iter().filter_map(|r| r.content_tag.as_deref()),
        None,
    )
}

fn ranked<'a>(
    dimension: Dimension,
    keys: impl Iterator<Item = &'a str>,
    top_n: Option<usize>,
) -> GroupedCount {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }

    // BTreeMap yields keys ascending; the stable sort keeps that for ties
    let mut entries: Vec<GroupEntry> = counts
        .into_iter()
        .map(|(key, count)| GroupEntry::new(key, count))
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count));

    if let Some(n) = top_n {
        entries.truncate(n);
    }
    GroupedCount::new(dimension, entries)
}
