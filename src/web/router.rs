//! Router configuration for the HTTP API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, HttpMakeClassifier, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;
use utoipa::OpenApi;

use super::dto::{FileResponse, MessageResponse, MoveRequest, UploadResponse};
use super::error::{ErrorBody, ErrorCode, ErrorDetail};
use super::handlers::{self, delete_file, download_file, list_files, move_file, upload_file, AppState};
use super::middleware::create_cors_layer;

/// Room for multipart boundaries and the text fields around the file part.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// OpenAPI document for the file API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "filestash API",
        description = "Upload, list, download, move and delete stored files."
    ),
    paths(
        handlers::file::upload_file,
        handlers::file::list_files,
        handlers::file::download_file,
        handlers::file::move_file,
        handlers::file::delete_file,
    ),
    components(schemas(
        UploadResponse,
        FileResponse,
        MessageResponse,
        MoveRequest,
        ErrorBody,
        ErrorDetail,
        ErrorCode,
    )),
    tags(
        (name = "files", description = "File storage operations")
    )
)]
pub struct ApiDoc;

/// Request tracing: one INFO span per request, closed by a response line
/// carrying status and latency in milliseconds.
fn http_trace_layer() -> TraceLayer<HttpMakeClassifier> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let body_limit = app_state.max_upload_size.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/upload", post(upload_file))
        .route("/files", get(list_files))
        .route("/files/:id", delete(delete_file))
        .route("/files/:id/move", patch(move_file))
        .route("/file/:id", get(download_file))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(http_trace_layer())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Create the router serving the OpenAPI document.
pub fn create_openapi_router() -> Router {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}

/// Create the full application router.
pub fn create_app(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    create_router(app_state, cors_origins)
        .merge(create_health_router())
        .merge(create_openapi_router())
}
