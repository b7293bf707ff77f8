//! HTTP handlers for the file API consumed by the browser.
//! Downloads stream the object body straight from the store; uploads are read
//! from the multipart `file` field and forwarded to `StorageService`.

use crate::{
    errors::AppError, models::file::FileList, services::storage_service::StorageService,
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use tracing::info;

/// Name of the multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "file";

/// RFC 5987 `attr-char`: everything outside it is percent-encoded.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub name: String,
    pub size: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub name: String,
}

/// `GET /api/files` — list every file in the bucket.
pub async fn list_files(State(service): State<StorageService>) -> Result<Json<FileList>, AppError> {
    let files = service.list_files().await?;
    Ok(Json(FileList { files }))
}

/// `POST /api/upload` — store the multipart `file` field under its file name.
pub async fn upload_file(
    State(service): State<StorageService>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::bad_request("uploaded file has no name"))?;
        // Dot segments do not survive URL normalization on download/delete.
        if name == "." || name == ".." {
            return Err(AppError::bad_request(format!(
                "file name `{}` is not allowed",
                name
            )));
        }
        let content_type = field.content_type().map(str::to_string);
        let body = field.bytes().await.map_err(multipart_error)?;
        let size = body.len();

        service.put_file(&name, content_type, body).await?;
        info!("uploaded {} ({} bytes)", name, size);

        return Ok(Json(UploadResponse {
            message: "File uploaded successfully".into(),
            name,
            size,
        }));
    }

    Err(AppError::bad_request("No file provided"))
}

/// `GET /api/download/{*filename}` — stream a file back as an attachment.
pub async fn download_file(
    State(service): State<StorageService>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let object = service.get_file(&filename).await?;

    let mut response = Response::new(Body::from_stream(object.body));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    set_download_headers(
        headers,
        &filename,
        object.content_type.as_deref(),
        object.content_length,
    );

    Ok(response)
}

/// `DELETE /api/delete/{*filename}` — remove a file.
pub async fn delete_file(
    State(service): State<StorageService>,
    Path(filename): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    service.remove_file(&filename).await?;
    info!("deleted {}", filename);

    Ok(Json(DeleteResponse {
        message: "File deleted successfully".into(),
        name: filename,
    }))
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::new(err.status(), err.body_text())
}

fn set_download_headers(
    headers: &mut HeaderMap,
    filename: &str,
    content_type: Option<&str>,
    content_length: Option<u64>,
) {
    headers.insert(
        header::CONTENT_TYPE,
        content_type
            .and_then(|value| HeaderValue::from_str(value).ok())
            .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream")),
    );

    if let Some(length) = content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    if let Ok(value) = HeaderValue::from_str(&content_disposition(filename)) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
}

/// Build an `attachment` disposition with an ASCII fallback name and the
/// exact UTF-8 name in `filename*` (RFC 6266).
fn content_disposition(key: &str) -> String {
    let base = key.rsplit('/').next().unwrap_or(key);
    let fallback: String = base
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let encoded = utf8_percent_encode(base, ATTR_CHAR);

    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{multipart_request, test_app};
    use axum::{body::to_bytes, http::Request};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn upload_then_list_returns_descriptor() {
        let (app, _backend) = test_app().await;

        let response = app
            .clone()
            .oneshot(multipart_request("file", Some("hello.txt"), b"hello world"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["name"], "hello.txt");
        assert_eq!(body["size"], 11);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/files")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let files = body["files"].as_array().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0]["name"], "hello.txt");
        assert_eq!(files[0]["size"], 11);
        assert!(files[0]["lastModified"].is_string());
    }

    #[tokio::test]
    async fn upload_without_file_field_is_rejected() {
        let (app, _backend) = test_app().await;

        let response = app
            .oneshot(multipart_request("attachment", Some("x.txt"), b"x"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "No file provided");
    }

    #[tokio::test]
    async fn upload_without_file_name_is_rejected() {
        let (app, _backend) = test_app().await;

        let response = app
            .oneshot(multipart_request("file", None, b"x"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_of_dot_segment_name_is_rejected() {
        let (app, backend) = test_app().await;

        for name in [".", ".."] {
            let response = app
                .clone()
                .oneshot(multipart_request("file", Some(name), b"x"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body = json_body(response).await;
            assert_eq!(body["error"], format!("file name `{}` is not allowed", name));
        }

        let service = crate::test_support::service_for(backend);
        assert!(service.list_files().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn download_streams_content_as_attachment() {
        let (app, _backend) = test_app().await;
        app.clone()
            .oneshot(multipart_request("file", Some("my report.txt"), b"quarterly"))
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/download/my%20report.txt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "9");
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"my report.txt\""));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"quarterly");
    }

    #[tokio::test]
    async fn download_of_missing_file_is_not_found() {
        let (app, _backend) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/download/ghost.bin")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_accepts_encoded_names_with_slashes() {
        let (app, backend) = test_app().await;
        app.clone()
            .oneshot(multipart_request("file", Some("a&b.txt"), b"1"))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/delete/a%26b.txt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["name"], "a&b.txt");

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/delete/nested%2Fpath.txt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["name"], "nested/path.txt");

        let service = crate::test_support::service_for(backend);
        assert!(service.list_files().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_internal_error() {
        let (app, backend) = test_app().await;
        backend
            .offline
            .store(true, std::sync::atomic::Ordering::SeqCst);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/files")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["status"], 500);
    }

    #[test]
    fn disposition_escapes_unsafe_names() {
        assert_eq!(
            content_disposition("docs/résumé \"v2\".pdf"),
            "attachment; filename=\"r_sum_ _v2_.pdf\"; \
             filename*=UTF-8''r%C3%A9sum%C3%A9%20%22v2%22.pdf"
        );
    }
}
