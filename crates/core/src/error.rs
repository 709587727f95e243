//! Error types and severity tiers for Shelfscope
//!
//! Errors are split into two severity tiers:
//! - **Degraded**: one output is skipped but the run continues (empty chart, etc.)
//! - **Fatal**: the run cannot produce anything useful (missing source, bad schema, etc.)
//!
//! [`AppError::user_message`] is what the binary prints; `Display` keeps the
//! internal detail for logs.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// One output is missing but the run can continue
    Degraded,
    /// The run must stop
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Degraded => write!(f, "Degraded"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Main error type for Shelfscope
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Source Errors =====
    /// Source database missing, unreadable, or not a database
    #[error("Source unavailable: {path}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    /// Expected tables or columns are absent from the source
    #[error("Schema mismatch: {details}")]
    SchemaMismatch { details: String },

    /// Query against the source failed after the schema was accepted
    #[error("Database error: {message}")]
    DatabaseError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ===== Output Errors =====
    /// Export requested an unrecognised sort column
    #[error("Invalid sort key '{key}' (expected one of: title, author, publisher, purchase_date, publication_date)")]
    InvalidSortKey { key: String },

    /// Chart could not be rendered
    #[error("Render error for {chart}: {reason}")]
    RenderError { chart: String, reason: String },

    /// List export could not be written
    #[error("Export to {path} failed: {reason}")]
    ExportError { path: PathBuf, reason: String },

    /// General I/O error
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: io::Error,
    },

    // ===== Generic Errors =====
    /// Invalid argument provided
    #[error("Invalid argument: {argument} - {reason}")]
    InvalidArgument { argument: String, reason: String },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RenderError { .. } => ErrorSeverity::Degraded,

            Self::SourceUnavailable { .. }
            | Self::SchemaMismatch { .. }
            | Self::DatabaseError { .. }
            | Self::InvalidSortKey { .. }
            | Self::ExportError { .. }
            | Self::IoError { .. }
            | Self::InvalidArgument { .. } => ErrorSeverity::Fatal,
        }
    }

    /// Returns a user-friendly error message suitable for console output
    pub fn user_message(&self) -> String {
        match self {
            Self::SourceUnavailable { path, .. } => format!(
                "Cannot open the library database at {}. Use --db-path to point at BookData.sqlite.",
                path.display()
            ),
            Self::SchemaMismatch { .. } => {
                "The file does not look like a Kindle library database.".to_string()
            }
            Self::DatabaseError { .. } => "Reading the library database failed.".to_string(),
            Self::InvalidSortKey { key } => format!(
                "Cannot sort by '{}'. Use title, author, publisher, purchase_date or publication_date.",
                key
            ),
            Self::RenderError { chart, .. } => format!("Skipped the {} chart.", chart),
            Self::ExportError { path, .. } => {
                format!("Could not write the book list to {}.", path.display())
            }
            Self::IoError { .. } => "A file operation failed. Please try again.".to_string(),
            Self::InvalidArgument { argument, .. } => format!("Invalid value for {}.", argument),
        }
    }

    /// Helper to create a database error from any error type
    pub fn database<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::DatabaseError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Helper to create an I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            message: message.into(),
            source,
        }
    }

    /// Helper to create a source-unavailable error
    pub fn source_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Helper to create a render error
    pub fn render(chart: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::RenderError {
            chart: chart.into(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        Self::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}
