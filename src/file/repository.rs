//! Record store: file metadata persistence.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::record::{FileRecord, NewFileRecord};
use crate::{Result, StashError};

/// Persistence of file records, keyed by id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a record and return it as stored.
    async fn insert(&self, record: &NewFileRecord) -> Result<FileRecord>;

    /// All records in insertion order.
    async fn list_all(&self) -> Result<Vec<FileRecord>>;

    /// Look up a record by id.
    async fn get_by_id(&self, id: &str) -> Result<Option<FileRecord>>;

    /// Set the logical path of a record. Returns `false` when no row matched.
    async fn update_path(&self, id: &str, logical_path: &str) -> Result<bool>;

    /// Delete a record. Returns `false` when no row matched.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Number of stored records.
    async fn count(&self) -> Result<i64>;
}

/// SQLite-backed record store.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: SqlitePool,
}

impl FileRepository {
    /// Create a new FileRepository over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for FileRepository {
    async fn insert(&self, record: &NewFileRecord) -> Result<FileRecord> {
        sqlx::query(
            "INSERT INTO files (id, name, path, original_name, storage_location, size)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.logical_path)
        .bind(&record.original_name)
        .bind(&record.storage_location)
        .bind(record.size)
        .execute(&self.pool)
        .await
        .map_err(|e| StashError::Database(e.to_string()))?;

        self.get_by_id(&record.id)
            .await?
            .ok_or_else(|| StashError::NotFound("file".to_string()))
    }

    async fn list_all(&self) -> Result<Vec<FileRecord>> {
        let files = sqlx::query_as::<_, FileRecord>(
            "SELECT id, name, path, original_name, storage_location, size, created_at
             FROM files ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(files)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>(
            "SELECT id, name, path, original_name, storage_location, size, created_at
             FROM files WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(file)
    }

    async fn update_path(&self, id: &str, logical_path: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE files SET path = ? WHERE id = ?")
            .bind(logical_path)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM files")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(count.0)
    }
}
