//! filestash - a minimal file storage service.
//!
//! Uploaded content is written to local disk under a generated name, and a
//! metadata record for it is kept in SQLite. An HTTP API exposes upload,
//! listing, download, move and delete.

pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use db::Database;
pub use error::{Result, StashError};
pub use file::{FileRecord, FileRegistry, FileStorage};
pub use web::WebServer;
