//! Shelfscope Configuration System
//!
//! Settings live in one TOML file split into sections, each a type
//! implementing [`ConfigSection`].
//!
//! # Architecture
//!
//! - **Layered**: defaults < config file < `SHELFSCOPE_*` env vars < CLI flags
//! - **Lenient load**: invalid values are logged as warnings, not rejected
//! - **Strict write**: invalid configs are never written
//! - **Atomic writes**: the file is replaced through a temporary file
//!
//! # Example
//!
//! ```rust,no_run
//! use shelfscope_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load_or_default();
//!
//! println!("Charts go to {}", config.report.output_dir.display());
//! ```

mod error;
mod file;
mod manager;
mod validation;

// Config sections
pub mod app_config;
pub mod export_config;
pub mod report_config;
pub mod source_config;

pub use error::{ConfigError, ConfigResult};
pub use manager::ConfigManager;
pub use validation::{Checks, ConfigSection, ValidationError};

pub use app_config::{AppConfig, LogLevel};
pub use export_config::ExportConfig;
pub use report_config::{ChartConfig, ReportConfig};
pub use source_config::SourceConfig;

use serde::{Deserialize, Serialize};

/// Name of the config file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Application-level settings
    pub app: AppConfig,

    /// Library database location
    pub source: SourceConfig,

    /// Chart output
    pub report: ReportConfig,

    /// Chart appearance
    pub chart: ChartConfig,

    /// Book list export defaults
    pub export: ExportConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for result in [
            self.app.validate(),
            self.source.validate(),
            self.report.validate(),
            self.chart.validate(),
            self.export.validate(),
        ] {
            if let Err(mut e) = result {
                errors.append(&mut e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_collects_across_sections() {
        let mut config = Config::default();
        config.report.top_n = 0;
        config.export.format = "csv".to_string();

        let errors = config.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["report.top_n", "export.format"]);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[report]\ntop_n = 5\n").unwrap();
        assert_eq!(config.report.top_n, 5);
        assert_eq!(config.export, ExportConfig::default());
        assert!(config.source.database_path.is_none());
    }
}
