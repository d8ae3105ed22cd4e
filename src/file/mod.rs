//! File management module for filestash.
//!
//! This module provides:
//! - File records and their SQLite record store
//! - Blob storage on local disk with UUID naming
//! - The registry that coordinates both for create, list, get, move and delete

mod record;
mod registry;
mod repository;
mod storage;

pub use record::{FileRecord, NewFileRecord};
pub use registry::{Download, FileRegistry, Upload};
pub use repository::{FileRepository, RecordStore};
pub use storage::{bytes_stream, BlobReader, BlobStore, ByteStream, FileStorage, StoredBlob};

/// Logical path given to files uploaded without one.
pub const ROOT_PATH: &str = "/";

/// Default maximum upload size (10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
