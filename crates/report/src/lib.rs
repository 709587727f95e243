//! Shelfscope Report Generation
//!
//! Turns loaded [`BookRecord`](shelfscope_core::BookRecord)s into grouped
//! counts, SVG charts and sorted book lists.

pub mod aggregate;
pub mod chart;
pub mod export;
pub mod runner;
pub mod summary;

pub use aggregate::{
    count_by_author, count_by_month, count_by_publisher, count_by_tag, count_by_year,
    count_by_year_of, DEFAULT_TOP_N,
};
pub use chart::{default_font_family, render_chart, ChartKind, ChartSpec, Orientation};
pub use export::{export_books, select_books, ExportFormat, ExportRequest, SortKey};
pub use runner::{ReportKind, ReportOptions, ReportOutcome, ReportRunner, ReportStatus, RunSummary};
pub use summary::LibrarySummary;
