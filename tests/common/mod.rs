//! Test helpers for the file API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use tempfile::TempDir;

use filestash::file::{FileRegistry, FileStorage};
use filestash::web::handlers::AppState;
use filestash::web::router::create_app;
use filestash::Database;

/// A running test server with its backing stores.
pub struct TestApp {
    pub server: TestServer,
    pub registry: FileRegistry,
    pub storage: FileStorage,
    pub db: Database,
    _storage_dir: TempDir,
}

/// Create a test server over an in-memory database and a temporary storage root.
pub async fn create_test_app() -> TestApp {
    create_test_app_with_limit(None).await
}

/// Create a test server with a custom upload limit in bytes.
pub async fn create_test_app_with_limit(max_upload_size: Option<usize>) -> TestApp {
    let storage_dir = TempDir::new().expect("Failed to create storage dir");
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let storage = FileStorage::new(storage_dir.path()).expect("Failed to create storage");

    let registry = FileRegistry::with_database(&db, storage.clone());

    let mut app_state = AppState::new(registry.clone());
    if let Some(limit) = max_upload_size {
        app_state = app_state.with_max_upload_size(limit);
    }

    let router = create_app(Arc::new(app_state), &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        registry,
        storage,
        db,
        _storage_dir: storage_dir,
    }
}

/// Build a multipart form holding a single file part.
pub fn file_form(filename: &str, content: &'static [u8]) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from_static(content)).file_name(filename.to_string());
    MultipartForm::new().add_part("file", part)
}
