//! Blob store: physical file storage.
//!
//! Uploaded content is written under a UUID-based name with the original
//! extension, sharded by the first two characters of that name:
//!
//! ```text
//! {base_path}/
//! ├── ab/
//! │   └── ab12cd34-5678-90ab-cdef-123456789012.txt
//! ├── cd/
//! │   └── cd90ab12-3456-7890-abcd-ef1234567890.bin
//! └── ...
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::Result;

/// Longest original extension carried over to a stored name.
const MAX_EXTENSION_LEN: usize = 16;

/// Stream of content chunks.
pub type ByteStream<'a> = BoxStream<'a, std::io::Result<Bytes>>;

/// Outcome of a successful blob write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Opaque handle for later reads and removal.
    pub location: String,
    /// Number of bytes written.
    pub size: u64,
}

/// An opened blob ready to be streamed.
pub struct BlobReader {
    /// Content length in bytes.
    pub size: u64,
    /// Content chunks.
    pub content: ByteStream<'static>,
}

impl std::fmt::Debug for BlobReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobReader").field("size", &self.size).finish()
    }
}

/// Opaque byte storage addressed by a server-assigned location.
///
/// Every failure, including a missing blob, is reported as
/// `StashError::Io` so callers can tell it apart from a missing record.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write a new blob and return where it was stored.
    async fn put(&self, original_name: &str, content: ByteStream<'_>) -> Result<StoredBlob>;

    /// Open the blob at `location` for streaming.
    async fn open(&self, location: &str) -> Result<BlobReader>;

    /// Remove the blob at `location`.
    async fn remove(&self, location: &str) -> Result<()>;
}

/// Local disk blob store.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Base directory for file storage.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage with the given base path.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Check if a blob exists.
    pub fn exists(&self, location: &str) -> bool {
        self.get_file_path(location).is_file()
    }

    /// Get the full file path for a location.
    ///
    /// The path is `{base_path}/{shard}/{location}`, where shard is the
    /// first 2 characters of the location.
    pub fn get_file_path(&self, location: &str) -> PathBuf {
        let shard = Self::get_shard(location);
        self.base_path.join(shard).join(location)
    }

    /// Get the shard directory name for a location.
    fn get_shard(location: &str) -> &str {
        location.get(..2).unwrap_or(location)
    }

    /// Extract the file extension from a filename.
    ///
    /// Returns "bin" when there is none, or when it is longer than
    /// `MAX_EXTENSION_LEN` or holds anything but ASCII alphanumerics.
    fn extract_extension(filename: &str) -> &str {
        Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .filter(|ext| {
                ext.len() <= MAX_EXTENSION_LEN && ext.chars().all(|c| c.is_ascii_alphanumeric())
            })
            .unwrap_or("bin")
    }

    /// Generate a new UUID-based location with the original name's extension.
    pub fn generate_location(original_name: &str) -> String {
        let uuid = Uuid::new_v4();
        let ext = Self::extract_extension(original_name);
        format!("{uuid}.{ext}")
    }

    /// Remove empty shard directories. Returns how many were removed.
    pub fn cleanup_empty_dirs(&self) -> Result<usize> {
        let mut removed = 0;

        for entry in fs::read_dir(&self.base_path)?.flatten() {
            let path = entry.path();
            if path.is_dir() {
                if let Ok(dir_entries) = fs::read_dir(&path) {
                    if dir_entries.count() == 0 && fs::remove_dir(&path).is_ok() {
                        removed += 1;
                    }
                }
            }
        }

        Ok(removed)
    }

    async fn write_stream(path: &Path, mut content: ByteStream<'_>) -> Result<u64> {
        let mut file = tokio::fs::File::create(path).await?;
        let mut written = 0u64;

        while let Some(chunk) = content.try_next().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        Ok(written)
    }
}

#[async_trait]
impl BlobStore for FileStorage {
    async fn put(&self, original_name: &str, content: ByteStream<'_>) -> Result<StoredBlob> {
        let location = Self::generate_location(original_name);
        let file_path = self.get_file_path(&location);

        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        match Self::write_stream(&file_path, content).await {
            Ok(size) => {
                tracing::debug!(location = %location, size, "Stored blob");
                Ok(StoredBlob { location, size })
            }
            Err(e) => {
                // Drop the partial file; nothing references it yet.
                let _ = tokio::fs::remove_file(&file_path).await;
                Err(e)
            }
        }
    }

    async fn open(&self, location: &str) -> Result<BlobReader> {
        let file_path = self.get_file_path(location);

        let file = tokio::fs::File::open(&file_path).await?;
        let size = file.metadata().await?.len();

        Ok(BlobReader {
            size,
            content: ReaderStream::new(file).boxed(),
        })
    }

    async fn remove(&self, location: &str) -> Result<()> {
        let file_path = self.get_file_path(location);

        tokio::fs::remove_file(&file_path).await?;
        tracing::debug!(location = %location, "Removed blob");
        Ok(())
    }
}

/// Wrap an in-memory buffer as a single-chunk stream.
pub fn bytes_stream(content: impl Into<Bytes>) -> ByteStream<'static> {
    futures::stream::once(futures::future::ready(Ok(content.into()))).boxed()
}
