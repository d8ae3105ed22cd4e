//! File registry: coordinates the blob store and the record store.
//!
//! Each operation touches the record store and at most one blob store side
//! effect. There is no transaction spanning the two stores:
//!
//! - `create` writes the blob first. If the record insert then fails the
//!   blob is left behind as an orphan.
//! - `delete` removes the record first. If the blob removal then fails the
//!   error is reported although the record is already gone.
//!
//! Neither case is rolled back or retried.

use std::sync::Arc;

use uuid::Uuid;

use super::record::{FileRecord, NewFileRecord};
use super::repository::{FileRepository, RecordStore};
use super::storage::{BlobStore, ByteStream, FileStorage};
use super::ROOT_PATH;
use crate::db::Database;
use crate::{Result, StashError};

/// An incoming upload.
pub struct Upload<'a> {
    /// Filename the content arrived with.
    pub original_name: String,
    /// Display name. Defaults to `original_name`.
    pub name: Option<String>,
    /// Logical path. Defaults to the root path.
    pub logical_path: Option<String>,
    /// Size announced by the transport, if any.
    pub declared_size: Option<u64>,
    /// Content chunks.
    pub content: ByteStream<'a>,
}

impl<'a> Upload<'a> {
    /// Create an upload with no name, path or declared size.
    pub fn new(original_name: impl Into<String>, content: ByteStream<'a>) -> Self {
        Self {
            original_name: original_name.into(),
            name: None,
            logical_path: None,
            declared_size: None,
            content,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Set the logical path.
    pub fn with_logical_path(mut self, logical_path: Option<String>) -> Self {
        self.logical_path = logical_path;
        self
    }

    /// Set the size announced by the transport.
    pub fn with_declared_size(mut self, declared_size: u64) -> Self {
        self.declared_size = Some(declared_size);
        self
    }
}

/// File content ready to be sent to a caller.
pub struct Download {
    /// Name the content should be saved under.
    pub original_name: String,
    /// Content length in bytes.
    pub size: u64,
    /// Content chunks.
    pub content: ByteStream<'static>,
}

/// Treat a missing or empty optional field as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// The file registry.
#[derive(Clone)]
pub struct FileRegistry {
    records: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
}

impl FileRegistry {
    /// Create a registry over the given stores.
    pub fn new(records: Arc<dyn RecordStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { records, blobs }
    }

    /// Create a registry backed by SQLite and local disk storage.
    pub fn with_database(db: &Database, storage: FileStorage) -> Self {
        Self::new(
            Arc::new(FileRepository::new(db.pool().clone())),
            Arc::new(storage),
        )
    }

    /// Store an upload and record its metadata.
    pub async fn create(&self, upload: Upload<'_>) -> Result<FileRecord> {
        if upload.original_name.is_empty() {
            return Err(StashError::Validation("no file provided".to_string()));
        }

        let Upload {
            original_name,
            name,
            logical_path,
            declared_size,
            content,
        } = upload;

        let stored = self.blobs.put(&original_name, content).await?;

        if let Some(declared) = declared_size {
            if declared != stored.size {
                tracing::warn!(
                    declared,
                    written = stored.size,
                    "Upload size differs from declared size"
                );
            }
        }

        let id = Uuid::new_v4().to_string();
        let name = non_empty(name).unwrap_or_else(|| original_name.clone());
        let logical_path = non_empty(logical_path).unwrap_or_else(|| ROOT_PATH.to_string());

        let new_record = NewFileRecord::new(&id, original_name, &stored.location, stored.size as i64)
            .with_name(name)
            .with_logical_path(logical_path);

        match self.records.insert(&new_record).await {
            Ok(record) => {
                tracing::info!(id = %record.id, size = record.size, "File created");
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(
                    location = %stored.location,
                    "Record insert failed after blob write; blob left orphaned"
                );
                Err(e)
            }
        }
    }

    /// All file records in insertion order.
    pub async fn list(&self) -> Result<Vec<FileRecord>> {
        self.records.list_all().await
    }

    /// Look up a single record.
    pub async fn find(&self, id: &str) -> Result<FileRecord> {
        self.records
            .get_by_id(id)
            .await?
            .ok_or_else(|| StashError::NotFound("file".to_string()))
    }

    /// Open a file's content.
    ///
    /// A missing record is `NotFound`; a record whose blob cannot be read is
    /// an `Io` error.
    pub async fn get(&self, id: &str) -> Result<Download> {
        let record = self.find(id).await?;
        let reader = self.blobs.open(&record.storage_location).await?;

        Ok(Download {
            original_name: record.original_name,
            size: reader.size,
            content: reader.content,
        })
    }

    /// Change a file's logical path.
    ///
    /// No lookup precedes the update. Returns `false` when no record matched;
    /// callers decide whether that is an error.
    pub async fn move_file(&self, id: &str, new_logical_path: &str) -> Result<bool> {
        let moved = self.records.update_path(id, new_logical_path).await?;
        if moved {
            tracing::info!(id = %id, path = %new_logical_path, "File moved");
        }
        Ok(moved)
    }

    /// Delete a file's record, then its blob.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let record = self.find(id).await?;

        if !self.records.delete(id).await? {
            // A concurrent delete got there first; its blob removal will race ours.
            tracing::debug!(id = %id, "Record already removed");
        }

        self.blobs
            .remove(&record.storage_location)
            .await
            .inspect_err(|_| {
                tracing::warn!(
                    id = %id,
                    location = %record.storage_location,
                    "Blob removal failed after record delete"
                );
            })?;

        tracing::info!(id = %id, "File deleted");
        Ok(())
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<i64> {
        self.records.count().await
    }
}
