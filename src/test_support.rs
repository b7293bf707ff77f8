//! Shared fixtures for handler, browser, and CLI tests.

use crate::{
    routes::routes::app,
    services::{memory_backend::MemoryBackend, storage_service::StorageService},
};
use axum::{Router, body::Body, http::Request};
use std::sync::Arc;
use tokio::net::TcpListener;

const BOUNDARY: &str = "file-gateway-test-boundary";

pub fn service_for(backend: Arc<MemoryBackend>) -> StorageService {
    StorageService::new(backend, "test-bucket", "us-east-1")
}

/// Router over a fresh in-memory backend with the bucket already created.
pub async fn test_app() -> (Router, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::default());
    let storage = service_for(backend.clone());
    storage.initialize_bucket().await.unwrap();
    (app(storage, 1024 * 1024), backend)
}

/// Serve a fresh test app on an ephemeral local port and return its base URL.
pub async fn spawn_server() -> String {
    let (router, _backend) = test_app().await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// `POST /api/upload` with a single multipart part.
pub fn multipart_request(field: &str, file_name: Option<&str>, content: &[u8]) -> Request<Body> {
    let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", field);
    if let Some(name) = file_name {
        disposition.push_str(&format!("; filename=\"{}\"", name));
    }

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(disposition.as_bytes());
    body.extend_from_slice(b"\r\nContent-Type: text/plain\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}
