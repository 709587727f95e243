//! Report orchestration
//!
//! A run computes each requested table independently and renders it. One
//! report failing never stops the others; every outcome ends up in the
//! [`RunSummary`].

use crate::aggregate::{self, DEFAULT_TOP_N};
use crate::chart::{self, ChartKind, ChartSpec, Orientation};
use shelfscope_core::{AppError, BookRecord, DateField, ErrorSeverity, GroupedCount};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// One chart the runner can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Yearly,
    Monthly,
    Publisher,
    Author,
    Tag,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::Yearly,
        ReportKind::Monthly,
        ReportKind::Publisher,
        ReportKind::Author,
        ReportKind::Tag,
    ];

    /// File written under the output directory
    pub fn file_name(&self) -> &'static str {
        match self {
            ReportKind::Yearly => "yearly_counts.svg",
            ReportKind::Monthly => "monthly_counts.svg",
            ReportKind::Publisher => "publisher_counts.svg",
            ReportKind::Author => "author_counts.svg",
            ReportKind::Tag => "tag_counts.svg",
        }
    }

    /// Chart layout for this report
    pub fn chart_spec(&self, options: &ReportOptions) -> ChartSpec {
        let spec = match self {
            ReportKind::Yearly => {
                let title = match options.year_basis {
                    DateField::Purchase => "Books per Year",
                    DateField::Publication => "Books per Publication Year",
                };
                ChartSpec::new(ChartKind::Bar(Orientation::Vertical), title)
                    .with_axes("Year", "Books")
                    .with_size(1200, 600)
            }
            ReportKind::Monthly => ChartSpec::new(ChartKind::Line, "Books Purchased per Month")
                .with_axes("Month", "Books")
                .with_size(1500, 600),
            ReportKind::Publisher => ChartSpec::new(
                ChartKind::Bar(Orientation::Horizontal),
                format!("Top {} Publishers", options.top_n),
            )
            .with_axes("Books", "Publisher")
            .with_size(1200, 800),
            ReportKind::Author => ChartSpec::new(
                ChartKind::Bar(Orientation::Horizontal),
                format!("Top {} Authors", options.top_n),
            )
            .with_axes("Books", "Author")
            .with_size(1200, 800),
            ReportKind::Tag => ChartSpec::new(
                ChartKind::Bar(Orientation::Vertical),
                "Books per Content Tag",
            )
            .with_axes("Content tag", "Books")
            .with_size(1000, 600),
        };
        spec.with_font_family(options.font_family.clone())
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Yearly => write!(f, "yearly"),
            ReportKind::Monthly => write!(f, "monthly"),
            ReportKind::Publisher => write!(f, "publisher"),
            ReportKind::Author => write!(f, "author"),
            ReportKind::Tag => write!(f, "tag"),
        }
    }
}

/// Settings shared by every report in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub output_dir: PathBuf,
    /// Length of the publisher and author rankings
    pub top_n: usize,
    /// Date attribute the yearly report groups by
    pub year_basis: DateField,
    pub font_family: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            top_n: DEFAULT_TOP_N,
            year_basis: DateField::Purchase,
            font_family: chart::default_font_family().to_string(),
        }
    }
}

impl ReportOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_year_basis(mut self, basis: DateField) -> Self {
        self.year_basis = basis;
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }
}

/// What happened to one report
#[derive(Debug)]
pub enum ReportStatus {
    Written(PathBuf),
    /// Degraded failure, the run still succeeds
    Skipped(AppError),
    Failed(AppError),
}

#[derive(Debug)]
pub struct ReportOutcome {
    pub kind: ReportKind,
    pub table: GroupedCount,
    pub status: ReportStatus,
}

/// Outcomes of every report attempted in a run
#[derive(Debug, Default)]
pub struct RunSummary {
    outcomes: Vec<ReportOutcome>,
}

impl RunSummary {
    pub fn outcomes(&self) -> &[ReportOutcome] {
        &self.outcomes
    }

    /// Paths of the charts that were written
    pub fn written(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.status {
                ReportStatus::Written(path) => Some(path.as_path()),
                _ => None,
            })
            .collect()
    }

    pub fn skipped(&self) -> Vec<(ReportKind, &AppError)> {
        self.with_status(|s| match s {
            ReportStatus::Skipped(e) => Some(e),
            _ => None,
        })
    }

    pub fn failed(&self) -> Vec<(ReportKind, &AppError)> {
        self.with_status(|s| match s {
            ReportStatus::Failed(e) => Some(e),
            _ => None,
        })
    }

    /// Returns true if no report failed fatally
    pub fn is_success(&self) -> bool {
        self.failed().is_empty()
    }

    /// Looks up the table computed for a report
    pub fn table(&self, kind: ReportKind) -> Option<&GroupedCount> {
        self.outcomes
            .iter()
            .find(|o| o.kind == kind)
            .map(|o| &o.table)
    }

    fn with_status<'s>(
        &'s self,
        pick: impl Fn(&'s ReportStatus) -> Option<&'s AppError>,
    ) -> Vec<(ReportKind, &'s AppError)> {
        self.outcomes
            .iter()
            .filter_map(|o| pick(&o.status).map(|e| (o.kind, e)))
            .collect()
    }
}

/// Computes and renders reports over a loaded library
pub struct ReportRunner {
    options: ReportOptions,
}

impl ReportRunner {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Computes the table behind a report without rendering it
    pub fn table(&self, records: &[BookRecord], kind: ReportKind) -> GroupedCount {
        let top_n = Some(self.options.top_n);
        match kind {
            ReportKind::Yearly => aggregate::count_by_year_of(records, self.options.year_basis),
            ReportKind::Monthly => aggregate::count_by_month(records),
            ReportKind::Publisher => aggregate::count_by_publisher(records, top_n),
            ReportKind::Author => aggregate::count_by_author(records, top_n),
            ReportKind::Tag => aggregate::count_by_tag(records),
        }
    }

    /// Runs the requested reports in order, collecting every outcome
    pub fn run(&self, records: &[BookRecord], kinds: &[ReportKind]) -> RunSummary {
        let mut summary = RunSummary::default();

        for &kind in kinds {
            let table = self.table(records, kind);
            let status = match self.render(kind, &table) {
                Ok(path) => ReportStatus::Written(path),
                Err(e) if e.severity() == ErrorSeverity::Degraded => {
                    log::warn!("Skipping {} report: {}", kind, e);
                    ReportStatus::Skipped(e)
                }
                Err(e) => {
                    log::error!("{} report failed: {}", kind, e);
                    ReportStatus::Failed(e)
                }
            };
            summary.outcomes.push(ReportOutcome {
                kind,
                table,
                status,
            });
        }

        summary
    }

    fn render(&self, kind: ReportKind, table: &GroupedCount) -> Result<PathBuf, AppError> {
        let path = self.options.output_dir.join(kind.file_name());
        if table.is_empty() {
            return Err(AppError::render(kind.to_string(), "no data to plot"));
        }

        fs::create_dir_all(&self.options.output_dir).map_err(|e| {
            AppError::io(
                format!(
                    "Failed to create output directory {}",
                    self.options.output_dir.display()
                ),
                e,
            )
        })?;

        chart::render_chart(table, &kind.chart_spec(&self.options), &path)?;
        Ok(path)
    }
}
