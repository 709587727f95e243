//! Book record queries

use crate::archive::decode_keyed_archive;
use crate::attributes::record_from_metadata;
use crate::schema::{BOOK_TABLE, METADATA_COLUMN};
use crate::DbPool;
use shelfscope_core::{AppError, BookRecord};
use sqlx::Row;

/// Loads every book row in storage order
///
/// A row whose blob is NULL or cannot be decoded still yields a record with
/// all fields unset, so the returned length always equals the row count.
pub async fn load_books(pool: &DbPool) -> Result<Vec<BookRecord>, AppError> {
    let query = format!(
        "SELECT {} FROM {} ORDER BY rowid",
        METADATA_COLUMN, BOOK_TABLE
    );
    let rows = sqlx::query(&query)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to load books", e))?;

    let mut books = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let blob: Option<Vec<u8>> = row
            .try_get(0)
            .map_err(|e| AppError::database("Failed to read metadata column", e))?;
        books.push(row_to_record(index, blob.as_deref()));
    }

    let undecoded = books.iter().filter(|b| b.is_blank()).count();
    if undecoded > 0 {
        log::info!("{} of {} books have no readable metadata", undecoded, books.len());
    }
    Ok(books)
}

fn row_to_record(index: usize, blob: Option<&[u8]>) -> BookRecord {
    let Some(bytes) = blob else {
        return BookRecord::default();
    };

    match decode_keyed_archive(bytes) {
        Ok(metadata) => record_from_metadata(&metadata),
        Err(e) => {
            log::warn!("Row {}: could not decode metadata: {}", index, e);
            BookRecord::default()
        }
    }
}
