//! File record types.

use crate::datetime::to_rfc3339;

/// Metadata row for one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FileRecord {
    /// Registry-assigned identifier (UUID v4).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Logical folder path. Organisational only, unrelated to disk layout.
    #[sqlx(rename = "path")]
    pub logical_path: String,
    /// Filename the upload arrived with.
    pub original_name: String,
    /// Blob store handle. Never sent to API callers.
    pub storage_location: String,
    /// Content length in bytes.
    pub size: i64,
    /// Creation time as stored by SQLite (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub created_at: String,
}

impl FileRecord {
    /// Creation time in RFC 3339 form.
    pub fn created_at_rfc3339(&self) -> String {
        to_rfc3339(&self.created_at)
    }
}

/// Data for inserting a new file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub id: String,
    pub name: String,
    pub logical_path: String,
    pub original_name: String,
    pub storage_location: String,
    pub size: i64,
}

impl NewFileRecord {
    /// Create a new record description. `name` and `logical_path` start out
    /// as the original name and the root path.
    pub fn new(
        id: impl Into<String>,
        original_name: impl Into<String>,
        storage_location: impl Into<String>,
        size: i64,
    ) -> Self {
        let original_name = original_name.into();
        Self {
            id: id.into(),
            name: original_name.clone(),
            logical_path: super::ROOT_PATH.to_string(),
            original_name,
            storage_location: storage_location.into(),
            size,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the logical path.
    pub fn with_logical_path(mut self, logical_path: impl Into<String>) -> Self {
        self.logical_path = logical_path.into();
        self
    }
}
