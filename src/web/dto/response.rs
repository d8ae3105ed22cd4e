//! Response DTOs for the HTTP API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::file::FileRecord;

/// Upload response.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// File ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Logical path.
    pub path: String,
    /// Stored size in bytes.
    pub size: i64,
}

impl From<FileRecord> for UploadResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            path: record.logical_path,
            size: record.size,
        }
    }
}

/// File entry in list responses.
///
/// The storage location stays server-side.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileResponse {
    /// File ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Logical path.
    pub path: String,
    /// Name the file was uploaded with.
    pub original_name: String,
    /// Size in bytes.
    pub size: i64,
    /// Creation time (RFC 3339).
    pub created_at: String,
}

impl From<FileRecord> for FileResponse {
    fn from(record: FileRecord) -> Self {
        let created_at = record.created_at_rfc3339();
        Self {
            id: record.id,
            name: record.name,
            path: record.logical_path,
            original_name: record.original_name,
            size: record.size,
            created_at,
        }
    }
}

/// Plain confirmation message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Message text.
    pub message: String,
}

impl MessageResponse {
    /// Create a new message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
