//! File handlers for the HTTP API.

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use bytes::Bytes;
use std::sync::Arc;

use crate::file::{bytes_stream, Upload};
use crate::web::dto::{FileResponse, MessageResponse, MoveRequest, UploadResponse};
use crate::web::error::{ApiError, ErrorBody};
use crate::web::handlers::AppState;
use crate::StashError;

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Control characters are dropped and quotes or backslashes replaced in the
/// plain `filename` parameter. Names that needed any of that, or that are not
/// ASCII, also get an RFC 5987 `filename*` parameter.
fn content_disposition_header(filename: &str) -> String {
    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            _ => c,
        })
        .collect();

    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// Size a multipart part announces in its own `Content-Length` header.
fn declared_part_size(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Map a multipart read failure, keeping body-limit rejections distinct.
fn multipart_error(e: MultipartError, state: &AppState) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        let max_mb = state.max_upload_size / 1024 / 1024;
        return ApiError::payload_too_large(format!("File too large (max {}MB)", max_mb));
    }
    tracing::error!("Failed to read multipart data: {}", e);
    ApiError::bad_request("Invalid multipart data")
}

/// POST /upload - Upload a file.
///
/// Multipart fields: `file` (required), `name` and `path` (optional).
#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    responses(
        (status = 200, description = "File uploaded", body = UploadResponse),
        (status = 400, description = "No file provided or invalid multipart data", body = ErrorBody),
        (status = 413, description = "File too large", body = ErrorBody),
        (status = 500, description = "Failed to upload file", body = ErrorBody)
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut filename: Option<String> = None;
    let mut content: Option<Bytes> = None;
    let mut declared_size: Option<u64> = None;
    let mut display_name: Option<String> = None;
    let mut logical_path: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, &state))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                // A part without a filename is not a file upload.
                let Some(original_name) = field.file_name().map(|s| s.to_string()) else {
                    continue;
                };
                filename = Some(original_name);
                declared_size = declared_part_size(field.headers());
                content = Some(field.bytes().await.map_err(|e| multipart_error(e, &state))?);
            }
            "name" => {
                display_name = Some(field.text().await.map_err(|e| multipart_error(e, &state))?);
            }
            "path" => {
                logical_path = Some(field.text().await.map_err(|e| multipart_error(e, &state))?);
            }
            _ => {}
        }
    }

    let (filename, content) = match (filename, content) {
        (Some(filename), Some(content)) if !filename.is_empty() => (filename, content),
        _ => return Err(ApiError::bad_request("No file provided")),
    };

    if content.len() > state.max_upload_size {
        let max_mb = state.max_upload_size / 1024 / 1024;
        return Err(ApiError::payload_too_large(format!(
            "File too large (max {}MB)",
            max_mb
        )));
    }

    let mut upload = Upload::new(filename, bytes_stream(content))
        .with_name(display_name)
        .with_logical_path(logical_path);
    if let Some(size) = declared_size {
        upload = upload.with_declared_size(size);
    }

    let record = state.registry.create(upload).await.map_err(|e| match e {
        StashError::Validation(_) => ApiError::bad_request("No file provided"),
        e => {
            tracing::error!("Failed to upload file: {}", e);
            ApiError::internal("Failed to upload file")
        }
    })?;

    Ok(Json(UploadResponse::from(record)))
}

/// GET /files - List all files.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "All file records", body = Vec<FileResponse>),
        (status = 500, description = "Failed to get files", body = ErrorBody)
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FileResponse>>, ApiError> {
    let records = state.registry.list().await.map_err(|e| {
        tracing::error!("Failed to get files: {}", e);
        ApiError::internal("Failed to get files")
    })?;

    Ok(Json(records.into_iter().map(FileResponse::from).collect()))
}

/// GET /file/:id - Download a file's content.
#[utoipa::path(
    get,
    path = "/file/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = ErrorBody),
        (status = 500, description = "Failed to get file", body = ErrorBody)
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Response, ApiError> {
    let download = state.registry.get(&file_id).await.map_err(|e| match e {
        StashError::NotFound(_) => ApiError::not_found("File not found"),
        e => {
            tracing::error!("Failed to get file: {}", e);
            ApiError::internal("Failed to get file")
        }
    })?;

    let content_type = mime_guess::from_path(&download.original_name)
        .first_or_octet_stream()
        .to_string();

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&download.original_name),
        )
        .header(header::CONTENT_LENGTH, download.size)
        .body(Body::from_stream(download.content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to get file")
        })?;

    Ok(response)
}

/// PATCH /files/:id/move - Change a file's logical path.
///
/// Reports success whether or not the id matched a record.
#[utoipa::path(
    patch,
    path = "/files/{id}/move",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    request_body = MoveRequest,
    responses(
        (status = 200, description = "File moved", body = MessageResponse),
        (status = 500, description = "Failed to move file", body = ErrorBody)
    )
)]
pub async fn move_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let moved = state
        .registry
        .move_file(&file_id, &req.path)
        .await
        .map_err(|e| {
            tracing::error!("Failed to move file: {}", e);
            ApiError::internal("Failed to move file")
        })?;

    if !moved {
        tracing::debug!(id = %file_id, "Move matched no file");
    }

    Ok(Json(MessageResponse::new("File moved successfully")))
}

/// DELETE /files/:id - Delete a file.
#[utoipa::path(
    delete,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted", body = MessageResponse),
        (status = 404, description = "File not found", body = ErrorBody),
        (status = 500, description = "Failed to delete file", body = ErrorBody)
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.registry.delete(&file_id).await.map_err(|e| match e {
        StashError::NotFound(_) => ApiError::not_found("File not found"),
        e => {
            tracing::error!("Failed to delete file: {}", e);
            ApiError::internal("Failed to delete file")
        }
    })?;

    Ok(Json(MessageResponse::new("File deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_part_size() {
        let mut headers = HeaderMap::new();
        assert_eq!(declared_part_size(&headers), None);

        headers.insert(header::CONTENT_LENGTH, "5".parse().unwrap());
        assert_eq!(declared_part_size(&headers), Some(5));

        headers.insert(header::CONTENT_LENGTH, "five".parse().unwrap());
        assert_eq!(declared_part_size(&headers), None);
    }

    #[test]
    fn test_content_disposition_header_simple_ascii() {
        let result = content_disposition_header("document.txt");
        assert_eq!(result, "attachment; filename=\"document.txt\"");
    }

    #[test]
    fn test_content_disposition_header_with_spaces() {
        let result = content_disposition_header("my document.txt");
        assert_eq!(result, "attachment; filename=\"my document.txt\"");
    }

    #[test]
    fn test_content_disposition_header_non_ascii() {
        let result = content_disposition_header("日本語ファイル.txt");
        assert!(result.starts_with("attachment; filename=\""));
        assert!(result.contains("filename*=UTF-8''"));
        assert!(result.contains("%E6%97%A5%E6%9C%AC%E8%AA%9E"));
        assert!(result.is_ascii());
    }

    #[test]
    fn test_content_disposition_header_double_quote() {
        let result = content_disposition_header("test\"file.txt");
        assert!(result.contains("filename=\"test_file.txt\""));
        assert!(result.contains("filename*=UTF-8''"));
        assert!(result.contains("%22"));
    }

    #[test]
    fn test_content_disposition_header_backslash() {
        let result = content_disposition_header("test\\file.txt");
        assert!(result.contains("filename=\"test_file.txt\""));
        assert!(result.contains("filename*=UTF-8''"));
    }

    #[test]
    fn test_content_disposition_header_control_characters() {
        // Header injection attempt
        let result = content_disposition_header("test\r\nX-Injected: bad.txt");
        assert!(!result.contains('\r'));
        assert!(!result.contains('\n'));
        assert!(result.starts_with("attachment; filename="));
    }

    #[test]
    fn test_content_disposition_header_null_character() {
        let result = content_disposition_header("test\x00null.txt");
        assert!(!result.contains('\x00'));
        assert!(result.starts_with("attachment; filename="));
    }

    #[test]
    fn test_content_disposition_header_mixed_attack() {
        let result = content_disposition_header("file\"\r\nX-Evil: header\r\n\r\n<script>.txt");
        assert!(!result.contains('\r'));
        assert!(!result.contains('\n'));
        assert!(result.starts_with("attachment; filename="));
    }
}
