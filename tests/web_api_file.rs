//! Web API File Tests
//!
//! Integration tests for upload, list, download, move and delete.

mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{json, Value};

use common::{create_test_app, create_test_app_with_limit, file_form};

/// Upload a file and return the response body.
async fn upload(server: &axum_test::TestServer, form: MultipartForm) -> Value {
    let response = server.post("/upload").multipart(form).await;
    response.assert_status_ok();
    response.json::<Value>()
}

// ============================================================================
// Upload
// ============================================================================

#[tokio::test]
async fn test_upload_defaults_name_and_path() {
    let app = create_test_app().await;

    let body = upload(&app.server, file_form("a.txt", b"hello")).await;

    assert!(!body["id"].as_str().unwrap().is_empty());
    assert_eq!(body["name"], "a.txt");
    assert_eq!(body["path"], "/");
    assert_eq!(body["size"], 5);
}

#[tokio::test]
async fn test_upload_with_name_and_path() {
    let app = create_test_app().await;

    let form = file_form("report-final-v3.pdf", b"%PDF-1.4")
        .add_text("name", "Report")
        .add_text("path", "/docs/2024");
    let body = upload(&app.server, form).await;

    assert_eq!(body["name"], "Report");
    assert_eq!(body["path"], "/docs/2024");
    assert_eq!(body["size"], 8);
}

#[tokio::test]
async fn test_upload_empty_fields_fall_back_to_defaults() {
    let app = create_test_app().await;

    let form = file_form("a.txt", b"hello")
        .add_text("name", "")
        .add_text("path", "");
    let body = upload(&app.server, form).await;

    assert_eq!(body["name"], "a.txt");
    assert_eq!(body["path"], "/");
}

#[tokio::test]
async fn test_upload_ids_are_unique() {
    let app = create_test_app().await;

    let first = upload(&app.server, file_form("a.txt", b"one")).await;
    let second = upload(&app.server, file_form("a.txt", b"two")).await;

    assert_ne!(first["id"], second["id"]);
}

#[tokio::test]
async fn test_upload_long_extension() {
    let app = create_test_app().await;
    let filename = format!("a.{}", "x".repeat(250));

    let body = upload(&app.server, file_form(&filename, b"hello")).await;
    assert_eq!(body["name"], filename.as_str());

    let id = body["id"].as_str().unwrap();
    let record = app.registry.find(id).await.unwrap();
    assert!(record.storage_location.ends_with(".bin"));

    let response = app.server.get(&format!("/file/{}", id)).await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"hello");
}

#[tokio::test]
async fn test_upload_without_file_part() {
    let app = create_test_app().await;

    let form = MultipartForm::new().add_text("name", "orphan");
    let response = app.server.post("/upload").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(app.registry.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_upload_file_part_without_filename() {
    let app = create_test_app().await;

    let form = MultipartForm::new().add_part("file", Part::text("not a file"));
    let response = app.server.post("/upload").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_too_large() {
    let app = create_test_app_with_limit(Some(16)).await;

    let response = app
        .server
        .post("/upload")
        .multipart(file_form("big.bin", &[0u8; 64]))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.registry.count().await.unwrap(), 0);
}

// ============================================================================
// List
// ============================================================================

#[tokio::test]
async fn test_list_empty() {
    let app = create_test_app().await;

    let response = app.server.get("/files").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!([]));
}

#[tokio::test]
async fn test_list_in_insertion_order() {
    let app = create_test_app().await;

    let first = upload(&app.server, file_form("first.txt", b"1")).await;
    let second = upload(&app.server, file_form("second.txt", b"22")).await;

    let response = app.server.get("/files").await;
    response.assert_status_ok();

    let files = response.json::<Vec<Value>>();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["id"], first["id"]);
    assert_eq!(files[1]["id"], second["id"]);
    assert_eq!(files[1]["original_name"], "second.txt");
    assert_eq!(files[1]["size"], 2);
    assert!(files[0]["created_at"].as_str().unwrap().ends_with('Z'));
    assert!(files[0].get("storage_location").is_none());
}

// ============================================================================
// Download
// ============================================================================

#[tokio::test]
async fn test_download_file() {
    let app = create_test_app().await;
    let body = upload(&app.server, file_form("a.txt", b"hello")).await;
    let id = body["id"].as_str().unwrap();

    let response = app.server.get(&format!("/file/{}", id)).await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"hello");
    assert_eq!(response.header("content-type"), "text/plain");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"a.txt\""
    );
    assert_eq!(response.header("content-length"), "5");
}

#[tokio::test]
async fn test_download_uses_original_name_after_rename() {
    let app = create_test_app().await;
    let form = file_form("photo.png", b"\x89PNG").add_text("name", "Holiday");
    let body = upload(&app.server, form).await;
    let id = body["id"].as_str().unwrap();

    let response = app.server.get(&format!("/file/{}", id)).await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"photo.png\""
    );
}

#[tokio::test]
async fn test_download_unknown_id() {
    let app = create_test_app().await;

    let response = app.server.get("/file/does-not-exist").await;

    response.assert_status_not_found();
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["message"], "File not found");
}

#[tokio::test]
async fn test_download_with_missing_blob() {
    let app = create_test_app().await;
    let body = upload(&app.server, file_form("a.txt", b"hello")).await;
    let id = body["id"].as_str().unwrap();

    let record = app.registry.find(id).await.unwrap();
    std::fs::remove_file(app.storage.get_file_path(&record.storage_location)).unwrap();

    let response = app.server.get(&format!("/file/{}", id)).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["message"], "Failed to get file");
}

// ============================================================================
// Move
// ============================================================================

#[tokio::test]
async fn test_move_changes_only_path() {
    let app = create_test_app().await;
    let uploaded = upload(&app.server, file_form("a.txt", b"hello")).await;
    let id = uploaded["id"].as_str().unwrap();

    let before = app.server.get("/files").await.json::<Vec<Value>>();

    let response = app
        .server
        .patch(&format!("/files/{}/move", id))
        .json(&json!({"path": "/archive"}))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["message"], "File moved successfully");

    let after = app.server.get("/files").await.json::<Vec<Value>>();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0]["path"], "/archive");

    let mut expected = before[0].clone();
    expected["path"] = json!("/archive");
    assert_eq!(after[0], expected);
}

#[tokio::test]
async fn test_move_unknown_id_reports_success() {
    let app = create_test_app().await;

    let response = app
        .server
        .patch("/files/does-not-exist/move")
        .json(&json!({"path": "/archive"}))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["message"], "File moved successfully");
    assert_eq!(app.registry.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_move_without_path_is_rejected() {
    let app = create_test_app().await;

    let response = app
        .server
        .patch("/files/anything/move")
        .json(&json!({}))
        .await;

    assert!(response.status_code().is_client_error());
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_file() {
    let app = create_test_app().await;
    let body = upload(&app.server, file_form("a.txt", b"hello")).await;
    let id = body["id"].as_str().unwrap();
    let record = app.registry.find(id).await.unwrap();

    let response = app.server.delete(&format!("/files/{}", id)).await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["message"], "File deleted successfully");
    assert!(!app.storage.get_file_path(&record.storage_location).exists());

    let files = app.server.get("/files").await.json::<Vec<Value>>();
    assert!(files.is_empty());
}

#[tokio::test]
async fn test_delete_unknown_id() {
    let app = create_test_app().await;

    let response = app.server.delete("/files/does-not-exist").await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["message"], "File not found");
}

#[tokio::test]
async fn test_delete_twice() {
    let app = create_test_app().await;
    let body = upload(&app.server, file_form("a.txt", b"hello")).await;
    let id = body["id"].as_str().unwrap();

    app.server
        .delete(&format!("/files/{}", id))
        .await
        .assert_status_ok();

    let response = app.server.delete(&format!("/files/{}", id)).await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_get_after_delete() {
    let app = create_test_app().await;
    let body = upload(&app.server, file_form("a.txt", b"hello")).await;
    let id = body["id"].as_str().unwrap();

    app.server
        .delete(&format!("/files/{}", id))
        .await
        .assert_status_ok();

    let response = app.server.get(&format!("/file/{}", id)).await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_delete_with_missing_blob() {
    let app = create_test_app().await;
    let body = upload(&app.server, file_form("a.txt", b"hello")).await;
    let id = body["id"].as_str().unwrap();

    let record = app.registry.find(id).await.unwrap();
    std::fs::remove_file(app.storage.get_file_path(&record.storage_location)).unwrap();

    let response = app.server.delete(&format!("/files/{}", id)).await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["error"]["message"], "Failed to delete file");

    // The record is gone even though the blob removal failed.
    app.server
        .get(&format!("/file/{}", id))
        .await
        .assert_status_not_found();
}

// ============================================================================
// Health and API docs
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_openapi_document() {
    let app = create_test_app().await;

    let response = app.server.get("/api-docs/openapi.json").await;

    response.assert_status_ok();
    let doc = response.json::<Value>();
    assert!(doc["paths"]["/upload"]["post"].is_object());
    assert!(doc["paths"]["/files/{id}/move"]["patch"].is_object());
}

#[tokio::test]
async fn test_data_survives_in_database() {
    let app = create_test_app().await;
    upload(&app.server, file_form("a.txt", b"hello")).await;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
        .fetch_one(app.db.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}
