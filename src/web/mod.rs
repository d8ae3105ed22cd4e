//! HTTP API for filestash.
//!
//! Thin request/response mapping over the [`FileRegistry`](crate::file::FileRegistry):
//! multipart upload, JSON listing, streamed download, move and delete.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_app, create_router};
pub use server::WebServer;
