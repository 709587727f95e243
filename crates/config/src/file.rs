//! Reading and writing the TOML file

use crate::{Config, ConfigError, ConfigResult};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Reads `path`, or returns defaults when it does not exist
///
/// Sections and keys left out of the file keep their defaults. Values that
/// parse but fail validation are kept and logged.
pub(crate) fn read_config(path: &Path) -> ConfigResult<Config> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if let Err(errors) = config.validate() {
        for error in &errors {
            log::warn!("{}: {}", path.display(), error);
        }
    }

    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Writes `config` to `path` through a temporary file in the same directory
///
/// Nothing is written when the config is invalid.
pub(crate) fn write_config(path: &Path, config: &Config) -> ConfigResult<()> {
    config.validate().map_err(ConfigError::Invalid)?;
    let text = toml::to_string_pretty(config)?;

    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_err)?;

    let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
    temp.write_all(text.as_bytes()).map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;

    log::info!("Wrote config to {}", path.display());
    Ok(())
}
