//! Source database configuration section

use crate::validation::{Checks, ConfigSection, ValidationError};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Location of the Kindle for Mac library below the home directory
pub const MAC_KINDLE_DATABASE: &str =
    "Library/Containers/com.amazon.Lassen/Data/Library/Protected/BookData.sqlite";

/// Fallback location relative to the working directory
pub const LOCAL_DATABASE: &str = "data/BookData.sqlite";

/// Where the library database is read from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SourceConfig {
    /// Explicit database path; discovered when unset
    pub database_path: Option<PathBuf>,
}

impl SourceConfig {
    /// Paths tried, in order, when no database path is configured
    pub fn default_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(dirs) = BaseDirs::new() {
            candidates.push(dirs.home_dir().join(MAC_KINDLE_DATABASE));
        }
        candidates.push(PathBuf::from(LOCAL_DATABASE));
        candidates
    }

    /// Returns the configured path, or the first default candidate that exists
    pub fn resolve(&self) -> Option<PathBuf> {
        if let Some(path) = &self.database_path {
            return Some(path.clone());
        }
        Self::first_existing(&Self::default_candidates())
    }

    fn first_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
        candidates
            .iter()
            .find(|p| Path::new(p).is_file())
            .cloned()
    }
}

impl ConfigSection for SourceConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        match &self.database_path {
            Some(path) => Checks::new().path("source.database_path", path).finish(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_is_valid() {
        let config = SourceConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_empty_database_path() {
        let config = SourceConfig {
            database_path: Some(PathBuf::new()),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_configured_path_wins() {
        let config = SourceConfig {
            database_path: Some(PathBuf::from("/nowhere/BookData.sqlite")),
        };
        assert_eq!(
            config.resolve(),
            Some(PathBuf::from("/nowhere/BookData.sqlite"))
        );
    }

    #[test]
    fn test_first_existing_candidate() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.sqlite");
        let present = temp_dir.path().join("BookData.sqlite");
        std::fs::write(&present, b"").unwrap();

        let found = SourceConfig::first_existing(&[missing.clone(), present.clone()]);
        assert_eq!(found, Some(present));
        assert_eq!(SourceConfig::first_existing(&[missing]), None);
    }

    #[test]
    fn test_candidates_end_with_local_path() {
        let candidates = SourceConfig::default_candidates();
        assert_eq!(candidates.last(), Some(&PathBuf::from(LOCAL_DATABASE)));
    }
}
