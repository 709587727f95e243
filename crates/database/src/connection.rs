//! Database connection management

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use shelfscope_core::AppError;

/// Database connection pool
pub type DbPool = Pool<Sqlite>;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: PathBuf,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Open the file without write access
    pub read_only: bool,
    /// Create database if it doesn't exist
    pub create_if_missing: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("BookData.sqlite"),
            max_connections: 1,
            read_only: true,
            create_if_missing: false,
        }
    }
}

impl DatabaseConfig {
    /// Creates a new configuration with a custom path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Enables or disables read-only mode
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets whether to create the database if missing
    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }
}

/// Checks that the source file exists and can be opened for reading
pub fn check_source(path: &Path) -> Result<(), AppError> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        let reason = match e.kind() {
            ErrorKind::NotFound => "file does not exist".to_string(),
            ErrorKind::PermissionDenied => "permission denied".to_string(),
            _ => e.to_string(),
        };
        AppError::source_unavailable(path, reason)
    })?;

    if !metadata.is_file() {
        return Err(AppError::source_unavailable(path, "not a regular file"));
    }

    File::open(path).map_err(|e| AppError::source_unavailable(path, e.to_string()))?;
    Ok(())
}

/// Establishes a connection pool to the database
///
/// Unless `create_if_missing` is set, the file must already exist and be a
/// readable SQLite database; anything else is `SourceUnavailable`.
pub async fn connect(config: DatabaseConfig) -> Result<DbPool, AppError> {
    if !config.create_if_missing {
        check_source(&config.path)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(&config.path)
        .read_only(config.read_only)
        .create_if_missing(config.create_if_missing);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| AppError::source_unavailable(&config.path, e.to_string()))?;

    // A non-SQLite file only fails on first read, so probe the header now
    if let Err(e) = sqlx::query("SELECT COUNT(*) FROM sqlite_master;")
        .execute(&pool)
        .await
    {
        pool.close().await;
        return Err(AppError::source_unavailable(
            &config.path,
            format!("not an SQLite database ({})", e),
        ));
    }

    log::debug!(
        "Opened {} (read_only={})",
        config.path.display(),
        config.read_only
    );
    Ok(pool)
}

/// Closes the database connection pool
pub async fn close(pool: DbPool) {
    pool.close().await;
}
