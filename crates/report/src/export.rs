//! Sorted book list export

use serde::{Deserialize, Serialize};
use shelfscope_core::{AppError, BookRecord, UNKNOWN_PLACEHOLDER};
use std::cmp::Ordering;
use std::fmt::{self, Write as _};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tempfile::NamedTempFile;

/// Heading written at the top of a markdown list
pub const DEFAULT_LIST_TITLE: &str = "Kindle Library";

/// Attribute the list is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Title,
    Author,
    Publisher,
    PurchaseDate,
    PublicationDate,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Title,
        SortKey::Author,
        SortKey::Publisher,
        SortKey::PurchaseDate,
        SortKey::PublicationDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Author => "author",
            SortKey::Publisher => "publisher",
            SortKey::PurchaseDate => "purchase_date",
            SortKey::PublicationDate => "publication_date",
        }
    }

    fn value<'r>(&self, record: &'r BookRecord) -> Option<SortValue<'r>> {
        match self {
            SortKey::Title => record.title.as_deref().map(SortValue::Text),
            SortKey::Author => record.author.as_deref().map(SortValue::Text),
            SortKey::Publisher => record.publisher.as_deref().map(SortValue::Text),
            SortKey::PurchaseDate => record.purchase_date.map(SortValue::Date),
            SortKey::PublicationDate => record.publication_date.map(SortValue::Date),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" | "title_from_metadata" => Ok(SortKey::Title),
            "author" => Ok(SortKey::Author),
            "publisher" => Ok(SortKey::Publisher),
            "purchase_date" => Ok(SortKey::PurchaseDate),
            "publication_date" => Ok(SortKey::PublicationDate),
            _ => Err(AppError::InvalidSortKey { key: s.to_string() }),
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue<'r> {
    Text(&'r str),
    Date(chrono::NaiveDate),
}

/// Output document format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Markdown,
    Json,
}

impl ExportFormat {
    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Markdown => write!(f, "markdown"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "json" => Ok(ExportFormat::Json),
            other => Err(AppError::InvalidArgument {
                argument: "format".to_string(),
                reason: format!("'{}' is not one of markdown, json", other),
            }),
        }
    }
}

/// Parameters of one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub sort_by: SortKey,
    pub ascending: bool,
    /// `None` and `Some(0)` both keep every record
    pub limit: Option<usize>,
    pub format: ExportFormat,
    pub title: String,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            sort_by: SortKey::PurchaseDate,
            ascending: false,
            limit: None,
            format: ExportFormat::Markdown,
            title: DEFAULT_LIST_TITLE.to_string(),
        }
    }
}

impl ExportRequest {
    /// Builds a request from a textual sort key, failing on unknown keys
    pub fn parse(sort_by: &str, ascending: bool, limit: Option<usize>) -> Result<Self, AppError> {
        Ok(Self {
            sort_by: sort_by.parse()?,
            ascending,
            limit,
            ..Default::default()
        })
    }

    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Orders and limits the records for listing
///
/// The sort is stable. Records without a value for the sort key always come
/// last, whichever the direction.
pub fn select_books<'r>(records: &'r [BookRecord], request: &ExportRequest) -> Vec<&'r BookRecord> {
    let key = request.sort_by;
    let mut books: Vec<&BookRecord> = records.iter().collect();

    books.sort_by(|a, b| match (key.value(a), key.value(b)) {
        (Some(x), Some(y)) if request.ascending => x.cmp(&y),
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    match request.limit {
        Some(n) if n > 0 => books.truncate(n),
        _ => {}
    }
    books
}

/// Renders the listed books as a markdown document
pub fn render_markdown(books: &[&BookRecord], title: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", title);
    let _ = writeln!(out, "Total: {} books\n", books.len());

    for (i, book) in books.iter().enumerate() {
        let _ = writeln!(out, "## {}. {}\n", i + 1, book.display_title());
        let _ = writeln!(out, "- **Author**: {}", or_unknown(book.author.as_deref()));
        let _ = writeln!(out, "- **Publisher**: {}", or_unknown(book.publisher.as_deref()));
        let _ = writeln!(out, "- **Purchased**: {}", date_or_unknown(book.purchase_date));
        let _ = writeln!(out, "- **Published**: {}", date_or_unknown(book.publication_date));
        if let Some(tag) = book.content_tag.as_deref() {
            let _ = writeln!(out, "- **Tag**: {}", tag);
        }
        out.push_str("\n---\n\n");
    }
    out
}

/// Renders the listed books as a pretty-printed JSON array
pub fn render_json(books: &[&BookRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(books)
}

/// Writes the sorted list to `path` and returns how many books it holds
///
/// The file is replaced atomically; on error any previous file is untouched.
pub fn export_books(
    records: &[BookRecord],
    request: &ExportRequest,
    path: &Path,
) -> Result<usize, AppError> {
    let books = select_books(records, request);

    let document = match request.format {
        ExportFormat::Markdown => render_markdown(&books, &request.title),
        ExportFormat::Json => render_json(&books).map_err(|e| AppError::ExportError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?,
    };

    write_atomic(path, &document)?;
    log::info!(
        "Exported {} books to {} ({}, sorted by {})",
        books.len(),
        path.display(),
        request.format,
        request.sort_by
    );
    Ok(books.len())
}

fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or(UNKNOWN_PLACEHOLDER)
}

fn date_or_unknown(value: Option<chrono::NaiveDate>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| UNKNOWN_PLACEHOLDER.to_string())
}

fn write_atomic(path: &Path, content: &str) -> Result<(), AppError> {
    let export_error = |reason: String| AppError::ExportError {
        path: path.to_path_buf(),
        reason,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| export_error(e.to_string()))?;
    }

    let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| export_error(e.to_string()))?;
    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| export_error(e.to_string()))?;
    temp_file.flush().map_err(|e| export_error(e.to_string()))?;
    temp_file
        .persist(path)
        .map_err(|e| export_error(e.error.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn records() -> Vec<BookRecord> {
        vec![
            BookRecord::new("Banana Fish")
                .with_author("Akimi Yoshida")
                .with_purchase_date(date(2023, 4, 1)),
            BookRecord::new("Akira")
                .with_author("Katsuhiro Otomo")
                .with_publisher("Kodansha")
                .with_purchase_date(date(2024, 2, 14))
                .with_content_tag("comic"),
            BookRecord::new("Cowboy Bebop"),
            BookRecord::new("Dorohedoro").with_purchase_date(date(2022, 9, 9)),
        ]
    }

    fn titles(books: &[&BookRecord]) -> Vec<String> {
        books.iter().map(|b| b.display_title().to_string()).collect()
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("title".parse::<SortKey>().unwrap(), SortKey::Title);
        assert_eq!("title_from_metadata".parse::<SortKey>().unwrap(), SortKey::Title);
        assert_eq!("Purchase_Date".parse::<SortKey>().unwrap(), SortKey::PurchaseDate);
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_unknown_sort_key() {
        match "isbn".parse::<SortKey>() {
            Err(AppError::InvalidSortKey { key }) => assert_eq!(key, "isbn"),
            other => panic!("expected InvalidSortKey, got {:?}", other),
        }
        assert!(ExportRequest::parse("rating", false, None).is_err());
    }

    #[test]
    fn test_default_sort_is_newest_purchase_first() {
        let records = records();
        let books = select_books(&records, &ExportRequest::default());
        assert_eq!(
            titles(&books),
            vec!["Akira", "Banana Fish", "Dorohedoro", "Cowboy Bebop"]
        );
    }

    #[test]
    fn test_nulls_last_when_ascending() {
        let records = records();
        let request = ExportRequest::parse("purchase_date", true, None).unwrap();
        let books = select_books(&records, &request);
        assert_eq!(
            titles(&books),
            vec!["Dorohedoro", "Banana Fish", "Akira", "Cowboy Bebop"]
        );
    }

    #[test]
    fn test_sort_is_stable_for_missing_values() {
        let records = records();
        let request = ExportRequest::parse("publisher", false, None).unwrap();
        let books = select_books(&records, &request);
        assert_eq!(
            titles(&books),
            vec!["Akira", "Banana Fish", "Cowboy Bebop", "Dorohedoro"]
        );
    }

    #[test]
    fn test_limit() {
        let records = records();
        let request = ExportRequest::parse("title", true, Some(2)).unwrap();
        assert_eq!(titles(&select_books(&records, &request)), vec!["Akira", "Banana Fish"]);

        let request = ExportRequest::parse("title", true, Some(0)).unwrap();
        assert_eq!(select_books(&records, &request).len(), 4);
    }

    #[test]
    fn test_markdown_layout() {
        let records = records();
        let request = ExportRequest::parse("title", true, Some(1)).unwrap();
        let doc = render_markdown(&select_books(&records, &request), "My Books");

        let expected = "# My Books\n\n\
            Total: 1 books\n\n\
            ## 1. Akira\n\n\
            - **Author**: Katsuhiro Otomo\n\
            - **Publisher**: Kodansha\n\
            - **Purchased**: 2024-02-14\n\
            - **Published**: unknown\n\
            - **Tag**: comic\n\
            \n---\n\n";
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_markdown_omits_missing_tag() {
        let record = BookRecord::default();
        let doc = render_markdown(&[&record], DEFAULT_LIST_TITLE);

        assert!(doc.contains("## 1. unknown"));
        assert!(doc.contains("- **Author**: unknown"));
        assert!(!doc.contains("**Tag**"));
    }

    #[test]
    fn test_export_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("books.json");
        let request = ExportRequest::parse("title", true, Some(2))
            .unwrap()
            .with_format(ExportFormat::Json);

        let written = export_books(&records(), &request, &path).unwrap();

        assert_eq!(written, 2);
        let parsed: Vec<BookRecord> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed[0].title.as_deref(), Some("Akira"));
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_export_creates_parent_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("books.md");

        export_books(&records(), &ExportRequest::default(), &path).unwrap();

        assert!(std::fs::read_to_string(&path).unwrap().starts_with("# Kindle Library"));
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!(matches!(
            "csv".parse::<ExportFormat>(),
            Err(AppError::InvalidArgument { .. })
        ));
    }
}
