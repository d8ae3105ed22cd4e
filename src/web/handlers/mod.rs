//! API handlers for the HTTP surface.

pub mod file;

pub use file::*;

use crate::file::{FileRegistry, DEFAULT_MAX_FILE_SIZE};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Coordinator for the record and blob stores.
    pub registry: FileRegistry,
    /// Maximum accepted upload size in bytes.
    pub max_upload_size: usize,
}

impl AppState {
    /// Create a new application state with the default upload limit.
    pub fn new(registry: FileRegistry) -> Self {
        Self {
            registry,
            max_upload_size: DEFAULT_MAX_FILE_SIZE as usize,
        }
    }

    /// Set the maximum upload size in bytes.
    pub fn with_max_upload_size(mut self, max_upload_size: usize) -> Self {
        self.max_upload_size = max_upload_size;
        self
    }
}
