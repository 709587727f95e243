//! Book record domain model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rendered in place of any attribute the source did not provide
pub const UNKNOWN_PLACEHOLDER: &str = "unknown";

/// One owned title as read from the library database
///
/// Every attribute is optional: the source metadata blob may omit any of
/// them, and a row whose blob cannot be decoded is kept with all fields unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub publication_date: Option<NaiveDate>,
    pub content_tag: Option<String>,
    pub asin: Option<String>,
}

impl BookRecord {
    /// Creates a record with only a title set
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn with_purchase_date(mut self, date: NaiveDate) -> Self {
        self.purchase_date = Some(date);
        self
    }

    pub fn with_publication_date(mut self, date: NaiveDate) -> Self {
        self.publication_date = Some(date);
        self
    }

    pub fn with_content_tag(mut self, tag: impl Into<String>) -> Self {
        self.content_tag = Some(tag.into());
        self
    }

    /// Returns the requested date attribute
    pub fn date(&self, field: DateField) -> Option<NaiveDate> {
        match field {
            DateField::Purchase => self.purchase_date,
            DateField::Publication => self.publication_date,
        }
    }

    /// Returns the title, or the placeholder when it is missing
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNKNOWN_PLACEHOLDER)
    }

    /// Returns true if no attribute could be read for this row
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

/// Date attributes a record can be grouped or sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateField {
    Purchase,
    Publication,
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateField::Purchase => write!(f, "purchase"),
            DateField::Publication => write!(f, "publication"),
        }
    }
}

impl FromStr for DateField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "purchase" | "purchase_date" => Ok(DateField::Purchase),
            "publication" | "publication_date" => Ok(DateField::Publication),
            other => Err(format!("unknown date field '{}'", other)),
        }
    }
}
