//! Book list export configuration section

use crate::validation::{Checks, ConfigSection, ValidationError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Accepted values of `export.sort_by`
pub const SORT_KEYS: [&str; 6] = [
    "title",
    "title_from_metadata",
    "author",
    "publisher",
    "purchase_date",
    "publication_date",
];

/// Accepted values of `export.format`
pub const EXPORT_FORMATS: [&str; 2] = ["markdown", "json"];

/// Defaults for the `export` command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Output document path; its extension follows the chosen format
    pub output: PathBuf,

    pub sort_by: String,

    /// Sort oldest/lowest first
    pub ascending: bool,

    /// Maximum number of listed books, unset or 0 for all
    pub limit: Option<usize>,

    pub format: String,

    /// Heading of the markdown document
    pub title: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("kindle_books.md"),
            sort_by: "purchase_date".to_string(),
            ascending: false,
            limit: None,
            format: "markdown".to_string(),
            title: "Kindle Library".to_string(),
        }
    }
}

impl ConfigSection for ExportConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::new()
            .path("export.output", &self.output)
            .one_of("export.sort_by", &self.sort_by, &SORT_KEYS)
            .one_of("export.format", &self.format, &EXPORT_FORMATS)
            .not_blank("export.title", &self.title)
            .finish()
    }
}
