//! Defines routes for the file browser and its JSON API.
//!
//! ## Structure
//! - **Page**
//!   - `GET    /` — file browser rendered with the current listing
//!
//! - **File API**
//!   - `GET    /api/files` — list files in the bucket
//!   - `POST   /api/upload` — upload the multipart `file` field
//!   - `GET    /api/download/{*filename}` — stream a file back
//!   - `DELETE /api/delete/{*filename}` — delete a file
//!
//! The wildcard `*filename` allows keys with slashes like `photos/2025/img.jpg`,
//! whether sent raw or percent-encoded.

use crate::{
    handlers::{
        file_handlers::{delete_file, download_file, list_files, upload_file},
        health_handlers::{healthz, readyz},
        page_handlers::index,
    },
    services::storage_service::StorageService,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

/// Build and return the router for all gateway routes.
///
/// The router carries shared state (`StorageService`) to all handlers.
pub fn routes() -> Router<StorageService> {
    Router::new()
        .route("/", get(index))
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // File API
        .route("/api/files", get(list_files))
        .route("/api/upload", post(upload_file))
        .route("/api/download/{*filename}", get(download_file))
        .route("/api/delete/{*filename}", delete(delete_file))
}

/// The complete application: routes, upload size limit, request tracing, state.
pub fn app(storage: StorageService, max_upload_bytes: usize) -> Router {
    routes()
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(storage)
}
