//! src/services/storage_service.rs
//!
//! StorageService — the gateway between the HTTP layer and the object store.
//! It owns the configured bucket name and a single shared backend handle;
//! every file operation is a pass-through to the backend, scoped to that bucket.

use crate::{
    models::file::FileDescriptor,
    services::object_backend::{ObjectBackend, ObjectDownload},
};
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object `{key}` not found")]
    ObjectNotFound { key: String },
    #[error("bucket `{0}` is already owned by this account")]
    BucketAlreadyOwned(String),
    #[error("object store error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// StorageService exposes the file operations the API needs:
/// - Initialize the bucket (create-if-absent)
/// - List files
/// - Upload a file
/// - Download a file as a stream
/// - Remove a file
///
/// It adds no validation, retries, or transformation of its own. Cloning is
/// cheap: clones share the same backend client.
#[derive(Clone)]
pub struct StorageService {
    /// Shared backend handle, constructed once at process start.
    pub backend: Arc<dyn ObjectBackend>,

    /// Bucket every operation is scoped to.
    pub bucket: String,

    /// Region used when the bucket has to be created.
    pub region: String,
}

impl StorageService {
    pub fn new(
        backend: Arc<dyn ObjectBackend>,
        bucket: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            bucket: bucket.into(),
            region: region.into(),
        }
    }

    /// Ensure the configured bucket exists, creating it if absent.
    ///
    /// Idempotent. Returns `true` when this call created the bucket. A create
    /// that loses a race to another creator under the same account counts as
    /// already existing.
    pub async fn initialize_bucket(&self) -> StorageResult<bool> {
        if self.backend.bucket_exists(&self.bucket).await? {
            debug!("bucket {} already exists", self.bucket);
            return Ok(false);
        }

        match self.backend.make_bucket(&self.bucket, &self.region).await {
            Ok(()) => {
                info!("created bucket {} in {}", self.bucket, self.region);
                Ok(true)
            }
            Err(StorageError::BucketAlreadyOwned(_)) => {
                debug!("bucket {} was created concurrently", self.bucket);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Readiness probe: the bucket must be reachable and present.
    pub async fn check_ready(&self) -> StorageResult<bool> {
        self.backend.bucket_exists(&self.bucket).await
    }

    pub async fn list_files(&self) -> StorageResult<Vec<FileDescriptor>> {
        self.backend.list_objects(&self.bucket).await
    }

    /// Store `body` under `name`, replacing any existing object with that key.
    pub async fn put_file(
        &self,
        name: &str,
        content_type: Option<String>,
        body: Bytes,
    ) -> StorageResult<()> {
        debug!("putting {} ({} bytes) into {}", name, body.len(), self.bucket);
        self.backend
            .put_object(&self.bucket, name, content_type, body)
            .await
    }

    pub async fn get_file(&self, name: &str) -> StorageResult<ObjectDownload> {
        self.backend.get_object(&self.bucket, name).await
    }

    /// Remove `name`. Removing a missing key succeeds, as in S3.
    pub async fn remove_file(&self, name: &str) -> StorageResult<()> {
        self.backend.remove_object(&self.bucket, name).await
    }
}
