//! End-to-end checks over in-memory libraries

use chrono::NaiveDate;
use shelfscope_core::{AppError, BookRecord};
use shelfscope_report::{
    count_by_author, count_by_month, count_by_publisher, count_by_tag, count_by_year,
    export_books, ExportRequest, ReportKind, ReportOptions, ReportRunner,
};
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn two_books_from_x() -> Vec<BookRecord> {
    vec![
        BookRecord::new("First")
            .with_publisher("X")
            .with_purchase_date(date(2024, 1, 10)),
        BookRecord::new("Second")
            .with_publisher("X")
            .with_purchase_date(date(2024, 3, 5)),
    ]
}

fn shelf_of_ten() -> Vec<BookRecord> {
    let publishers = ["Kodansha", "Shueisha", "Kodansha", "Viz", "Shueisha"];
    let authors = ["Ito", "Oda", "Ito", "Urasawa", "Oda"];
    (0..10u32)
        .map(|i| {
            BookRecord::new(format!("Volume {:02}", i))
                .with_publisher(publishers[i as usize % 5])
                .with_author(authors[i as usize % 5])
                .with_purchase_date(date(2020 + (i % 4) as i32, 1 + i % 12, 1 + i))
                .with_content_tag(if i % 3 == 0 { "novel" } else { "comic" })
        })
        .collect()
}

#[test]
fn test_two_purchases_scenario() {
    let records = two_books_from_x();

    assert_eq!(count_by_year(&records).pairs(), vec![("2024", 2)]);
    assert_eq!(count_by_publisher(&records, None).pairs(), vec![("X", 2)]);
    assert_eq!(
        count_by_month(&records).pairs(),
        vec![("2024-01", 1), ("2024-03", 1)]
    );
}

#[test]
fn test_year_total_matches_dated_records() {
    let mut records = shelf_of_ten();
    records.push(BookRecord::new("Undated").with_publisher("Viz"));

    let dated = records.iter().filter(|r| r.purchase_date.is_some()).count();
    assert_eq!(count_by_year(&records).total(), dated);
}

#[test]
fn test_rankings_are_ordered() {
    let records = shelf_of_ten();

    for table in [
        count_by_publisher(&records, None),
        count_by_author(&records, None),
        count_by_tag(&records),
    ] {
        let entries = table.entries();
        for pair in entries.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.count > b.count || (a.count == b.count && a.key < b.key),
                "{:?} before {:?}",
                a,
                b
            );
        }
    }
}

#[test]
fn test_month_keys_strictly_increase() {
    let table = count_by_month(&shelf_of_ten());
    let keys: Vec<&str> = table.entries().iter().map(|e| e.key.as_str()).collect();
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_export_limit_lists_top_three() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("books.md");
    let request = ExportRequest::parse("title", false, Some(3)).unwrap();

    let listed = export_books(&shelf_of_ten(), &request, &path).unwrap();

    assert_eq!(listed, 3);
    let doc = std::fs::read_to_string(&path).unwrap();
    assert!(doc.contains("Total: 3 books"));
    assert!(doc.contains("## 1. Volume 09"));
    assert!(doc.contains("## 3. Volume 07"));
    assert!(!doc.contains("## 4."));
}

#[test]
fn test_invalid_sort_key_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("books.md");

    let result = ExportRequest::parse("isbn", false, None)
        .and_then(|request| export_books(&shelf_of_ten(), &request, &path));

    assert!(matches!(result, Err(AppError::InvalidSortKey { .. })));
    assert!(!path.exists());
}

#[test]
fn test_runner_over_empty_library() {
    let dir = TempDir::new().unwrap();
    let runner = ReportRunner::new(ReportOptions::new(dir.path()));

    let summary = runner.run(&[], &ReportKind::ALL);

    assert!(summary.is_success());
    assert_eq!(summary.skipped().len(), ReportKind::ALL.len());
    assert!(summary.written().is_empty());
}

#[test]
fn test_runner_single_entry_chart_is_written() {
    let dir = TempDir::new().unwrap();
    let runner = ReportRunner::new(ReportOptions::new(dir.path()).with_top_n(5));

    let summary = runner.run(&two_books_from_x(), &[ReportKind::Yearly, ReportKind::Publisher]);

    assert_eq!(summary.written().len(), 2);
    assert!(dir.path().join("yearly_counts.svg").exists());
    assert!(dir.path().join("publisher_counts.svg").exists());
}
