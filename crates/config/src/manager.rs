//! Locating, loading and initialising the config file

use crate::app_config::LogLevel;
use crate::file::{read_config, write_config};
use crate::{Config, ConfigError, ConfigResult, CONFIG_FILE_NAME};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Overrides `source.database_path`
pub const ENV_DATABASE_PATH: &str = "SHELFSCOPE_SOURCE_DATABASE_PATH";
/// Overrides `report.output_dir`
pub const ENV_OUTPUT_DIR: &str = "SHELFSCOPE_REPORT_OUTPUT_DIR";
/// Overrides `app.log_level`
pub const ENV_LOG_LEVEL: &str = "SHELFSCOPE_APP_LOG_LEVEL";

/// Owns the config file location
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager using the default config directory
    ///
    /// - Linux: `~/.config/shelfscope/`
    /// - macOS: `~/Library/Application Support/shelfscope/`
    /// - Windows: `%APPDATA%\shelfscope\config\`
    pub fn new() -> ConfigResult<Self> {
        let config_dir = Self::default_config_dir()?;
        Ok(Self::with_directory(config_dir))
    }

    /// Creates a config manager with a custom config directory
    pub fn with_directory(config_dir: impl AsRef<Path>) -> Self {
        Self::with_file(config_dir.as_ref().join(CONFIG_FILE_NAME))
    }

    /// Creates a config manager for an explicit config file
    pub fn with_file(config_path: impl Into<PathBuf>) -> Self {
        Self {
            path: config_path.into(),
        }
    }

    /// Returns the default config directory based on the platform
    fn default_config_dir() -> ConfigResult<PathBuf> {
        ProjectDirs::from("", "", "shelfscope")
            .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full config file path
    pub fn config_path(&self) -> &Path {
        &self.path
    }

    /// Loads the config file, or defaults if there is none
    ///
    /// Unreadable or malformed files are errors. Out-of-range values are
    /// only logged.
    pub fn load(&self) -> ConfigResult<Config> {
        read_config(&self.path)
    }

    /// Loads the configuration, falling back to defaults on any error
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            }
        }
    }

    /// Generates a default config file if one doesn't exist
    ///
    /// Returns Ok(true) if a new file was created, Ok(false) if one already exists.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            log::info!(
                "Config file already exists at {}",
                self.config_path().display()
            );
            return Ok(false);
        }

        write_config(&self.path, &Config::default())?;
        Ok(true)
    }

    /// Loads the config file, falling back to defaults, then applies
    /// `SHELFSCOPE_*` environment overrides
    pub fn load_with_env_overrides(&self) -> Config {
        let mut config = self.load_or_default();
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        if let Err(errors) = config.validate() {
            for error in errors {
                log::warn!("After environment overrides: {}", error);
            }
        }

        config
    }
}

/// Applies overrides looked up through `lookup`
fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(db_path) = lookup(ENV_DATABASE_PATH).filter(|v| !v.is_empty()) {
        config.source.database_path = Some(PathBuf::from(db_path));
    }

    if let Some(output_dir) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.is_empty()) {
        config.report.output_dir = PathBuf::from(output_dir);
    }

    if let Some(level) = lookup(ENV_LOG_LEVEL) {
        match level.parse::<LogLevel>() {
            Ok(level) => config.app.log_level = level,
            Err(e) => log::warn!("Ignoring {}: {}", ENV_LOG_LEVEL, e),
        }
    }
}
