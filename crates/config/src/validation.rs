//! Per-section value checks
//!
//! Each section collects its problems with a [`Checks`] chain, so a config
//! with several bad values reports all of them at once.

use std::fmt::Display;
use std::path::Path;
use thiserror::Error;

/// One rejected config value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {message}")]
pub struct ValidationError {
    /// Dotted key, e.g. `report.top_n`
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// One `[section]` of the config file
pub trait ConfigSection: Default {
    /// Lists every invalid value in the section
    fn validate(&self) -> Result<(), Vec<ValidationError>>;
}

/// Accumulates failures for one section
#[derive(Debug, Default)]
#[must_use]
pub struct Checks {
    errors: Vec<ValidationError>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inclusive range
    pub fn range<T>(self, field: &str, value: T, min: T, max: T) -> Self
    where
        T: PartialOrd + Display,
    {
        let ok = value >= min && value <= max;
        self.check(ok, field, || {
            format!("must be between {} and {}, got {}", min, max, value)
        })
    }

    pub fn not_blank(self, field: &str, value: &str) -> Self {
        self.check(!value.trim().is_empty(), field, || "must not be empty".to_string())
    }

    pub fn path(self, field: &str, path: &Path) -> Self {
        self.check(!path.as_os_str().is_empty(), field, || {
            "must not be an empty path".to_string()
        })
    }

    pub fn one_of(self, field: &str, value: &str, allowed: &[&str]) -> Self {
        self.check(allowed.contains(&value), field, || {
            format!("must be one of {}, got '{}'", allowed.join(", "), value)
        })
    }

    pub fn finish(self) -> Result<(), Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    fn check(mut self, ok: bool, field: &str, message: impl FnOnce() -> String) -> Self {
        if !ok {
            self.errors.push(ValidationError::new(field, message()));
        }
        self
    }
}
