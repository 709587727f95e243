//! Source schema checks

use crate::DbPool;
use shelfscope_core::AppError;

/// Table holding one row per book
pub const BOOK_TABLE: &str = "ZBOOK";

/// Column holding the archived metadata blob
pub const METADATA_COLUMN: &str = "ZSYNCMETADATAATTRIBUTES";

/// Verifies the book table and metadata column exist
///
/// Extra tables and columns are ignored.
pub async fn verify_schema(pool: &DbPool) -> Result<(), AppError> {
    let columns = table_columns(pool, BOOK_TABLE).await?;

    if columns.is_empty() {
        return Err(AppError::SchemaMismatch {
            details: format!("table {} not found", BOOK_TABLE),
        });
    }

    if !columns
        .iter()
        .any(|c| c.eq_ignore_ascii_case(METADATA_COLUMN))
    {
        return Err(AppError::SchemaMismatch {
            details: format!("column {}.{} not found", BOOK_TABLE, METADATA_COLUMN),
        });
    }

    log::debug!("{} has {} columns", BOOK_TABLE, columns.len());
    Ok(())
}

/// Lists the column names of a table, empty when the table is missing
pub async fn table_columns(pool: &DbPool, table: &str) -> Result<Vec<String>, AppError> {
    sqlx::query_scalar("SELECT name FROM pragma_table_info(?)")
        .bind(table)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to read table info", e))
}
