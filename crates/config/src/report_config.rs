//! Chart report configuration sections

use crate::validation::{Checks, ConfigSection, ValidationError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Accepted values of `report.year_basis`
pub const YEAR_BASES: [&str; 2] = ["purchase", "publication"];

/// Chart output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory charts are written into
    pub output_dir: PathBuf,

    /// Length of the publisher and author rankings
    pub top_n: usize,

    /// Date the yearly chart groups by
    pub year_basis: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            top_n: 10,
            year_basis: "purchase".to_string(),
        }
    }
}

impl ConfigSection for ReportConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::new()
            .path("report.output_dir", &self.output_dir)
            .range("report.top_n", self.top_n, 1, 100)
            .one_of("report.year_basis", &self.year_basis, &YEAR_BASES)
            .finish()
    }
}

/// Chart appearance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ChartConfig {
    /// Font family for chart text; picked per platform when unset
    pub font_family: Option<String>,
}

impl ConfigSection for ChartConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        match &self.font_family {
            Some(family) => Checks::new().not_blank("chart.font_family", family).finish(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ReportConfig::default().validate().is_ok());
        assert!(ChartConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_top_n() {
        let mut config = ReportConfig::default();
        config.top_n = 0;
        assert!(config.validate().is_err());

        config.top_n = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_year_basis() {
        let config = ReportConfig {
            year_basis: "release".to_string(),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "report.year_basis");
    }

    #[test]
    fn test_blank_font_family() {
        let config = ChartConfig {
            font_family: Some("   ".to_string()),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_every_bad_value_is_reported() {
        let config = ReportConfig {
            output_dir: PathBuf::new(),
            top_n: 0,
            year_basis: "release".to_string(),
        };
        let fields: Vec<_> = config
            .validate()
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(
            fields,
            vec!["report.output_dir", "report.top_n", "report.year_basis"]
        );
    }
}
