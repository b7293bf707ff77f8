//! Object backend abstraction and the S3-compatible implementation.
//!
//! `ObjectBackend` is the seam between the gateway and the object store. The
//! production backend is `S3Backend`, a thin adapter over `aws-sdk-s3` that
//! talks path-style to MinIO (or any S3-compatible endpoint). Each method is a
//! direct pass-through to the matching store call.

use crate::{
    config::StoreConfig,
    models::file::FileDescriptor,
    services::storage_service::{StorageError, StorageResult},
};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{
    Client,
    config::Credentials,
    error::DisplayErrorContext,
    primitives::{ByteStream, DateTime as S3DateTime},
    types::{BucketLocationConstraint, CreateBucketConfiguration},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use std::{io, pin::Pin};
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Region that S3 treats as the default; it must not be sent as a location constraint.
const DEFAULT_REGION: &str = "us-east-1";

/// Streaming object payload.
pub type ObjectStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// An object opened for download.
pub struct ObjectDownload {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub body: ObjectStream,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool>;

    /// Create `bucket` in `region`.
    ///
    /// Returns `BucketAlreadyOwned` when the store reports the caller already
    /// owns a bucket by that name.
    async fn make_bucket(&self, bucket: &str, region: &str) -> StorageResult<()>;

    /// List every object in the bucket, in key order.
    async fn list_objects(&self, bucket: &str) -> StorageResult<Vec<FileDescriptor>>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<String>,
        body: Bytes,
    ) -> StorageResult<()>;

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectDownload>;

    async fn remove_object(&self, bucket: &str, key: &str) -> StorageResult<()>;
}

/// `ObjectBackend` backed by an `aws-sdk-s3` client.
pub struct S3Backend {
    client: Client,
}

impl S3Backend {
    /// Build the S3 client from the store configuration.
    ///
    /// Credentials are static (never read from the ambient AWS profile) and
    /// requests use path-style addressing, which MinIO requires.
    pub async fn connect(cfg: &StoreConfig) -> Self {
        let credentials = Credentials::new(
            cfg.access_key.clone(),
            cfg.secret_key.clone(),
            None,
            None,
            "file-gateway",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .endpoint_url(cfg.endpoint_url())
            .credentials_provider(credentials)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        debug!("S3 client configured for {}", cfg.endpoint_url());

        Self {
            client: Client::from_conf(s3_config),
        }
    }
}

#[async_trait]
impl ObjectBackend for S3Backend {
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let not_found = err.as_service_error().is_some_and(|e| e.is_not_found())
                    || err
                        .raw_response()
                        .is_some_and(|resp| resp.status().as_u16() == 404);
                if not_found {
                    Ok(false)
                } else {
                    Err(backend_error("head_bucket", err))
                }
            }
        }
    }

    async fn make_bucket(&self, bucket: &str, region: &str) -> StorageResult<()> {
        let mut request = self.client.create_bucket().bucket(bucket);
        if !region.eq_ignore_ascii_case(DEFAULT_REGION) {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_bucket_already_owned_by_you()) =>
            {
                Err(StorageError::BucketAlreadyOwned(bucket.to_string()))
            }
            Err(err) => Err(backend_error("create_bucket", err)),
        }
    }

    async fn list_objects(&self, bucket: &str) -> StorageResult<Vec<FileDescriptor>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        let mut files = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| backend_error("list_objects_v2", err))?;
            for object in page.contents() {
                let Some(name) = object.key() else {
                    continue;
                };
                files.push(FileDescriptor {
                    name: name.to_string(),
                    size: object.size().unwrap_or(0).max(0) as u64,
                    last_modified: object
                        .last_modified()
                        .and_then(to_utc)
                        .unwrap_or_default(),
                });
            }
        }

        Ok(files)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<String>,
        body: Bytes,
    ) -> StorageResult<()> {
        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body));
        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        request
            .send()
            .await
            .map_err(|err| backend_error("put_object", err))?;
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectDownload> {
        let output = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(err)
                if err.as_service_error().is_some_and(|e| e.is_no_such_key())
                    || err
                        .raw_response()
                        .is_some_and(|resp| resp.status().as_u16() == 404) =>
            {
                return Err(StorageError::ObjectNotFound {
                    key: key.to_string(),
                });
            }
            Err(err) => return Err(backend_error("get_object", err)),
        };

        let content_type = output.content_type().map(str::to_string);
        let content_length = output
            .content_length()
            .and_then(|len| u64::try_from(len).ok());
        let body = ReaderStream::new(output.body.into_async_read());

        Ok(ObjectDownload {
            content_type,
            content_length,
            body: Box::pin(body),
        })
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| backend_error("delete_object", err))?;
        Ok(())
    }
}

/// Render an SDK error with its full source chain.
fn backend_error<E>(operation: &str, err: E) -> StorageError
where
    E: std::error::Error + 'static,
{
    StorageError::Backend(format!("{operation}: {}", DisplayErrorContext(&err)))
}

fn to_utc(ts: &S3DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}
