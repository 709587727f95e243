//! Shelfscope Database Layer
//!
//! Reads the Kindle reader's `BookData.sqlite` without modifying it. Each
//! row of `ZBOOK` carries a keyed-archive blob in `ZSYNCMETADATAATTRIBUTES`;
//! this crate decodes those blobs into [`BookRecord`]s.

pub mod archive;
pub mod attributes;
pub mod connection;
pub mod queries;
pub mod schema;

use shelfscope_core::{AppError, BookRecord};
use std::path::Path;

pub use connection::{connect, DatabaseConfig, DbPool};
pub use queries::load_books;
pub use schema::verify_schema;

/// Opens the source read-only, validates it and loads every book
///
/// The connection is closed before returning on both the success and the
/// failure path.
pub async fn load_library(path: impl AsRef<Path>) -> Result<Vec<BookRecord>, AppError> {
    let path = path.as_ref();
    let pool = connect(DatabaseConfig::new(path)).await?;

    let result = match verify_schema(&pool).await {
        Ok(()) => load_books(&pool).await,
        Err(e) => Err(e),
    };
    connection::close(pool).await;

    let books = result?;
    log::info!("Loaded {} books from {}", books.len(), path.display());
    Ok(books)
}
