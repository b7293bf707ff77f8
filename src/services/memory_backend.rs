//! In-memory `ObjectBackend` used by tests across the crate.

use crate::{
    models::file::FileDescriptor,
    services::{
        object_backend::{ObjectBackend, ObjectDownload},
        storage_service::{StorageError, StorageResult},
    },
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::{
    collections::BTreeMap,
    io,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

struct StoredObject {
    content_type: Option<String>,
    body: Bytes,
    last_modified: DateTime<Utc>,
}

#[derive(Default)]
pub struct MemoryBackend {
    buckets: Mutex<BTreeMap<String, BTreeMap<String, StoredObject>>>,
    /// Number of successful `make_bucket` calls.
    pub bucket_creations: AtomicUsize,
    /// When set, every call fails as if the store were unreachable.
    pub offline: AtomicBool,
}

impl MemoryBackend {
    fn check_online(&self) -> StorageResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StorageError::Backend("connection refused".into()))
        } else {
            Ok(())
        }
    }

    fn missing_bucket(bucket: &str) -> StorageError {
        StorageError::Backend(format!("NoSuchBucket: {bucket}"))
    }
}

#[async_trait]
impl ObjectBackend for MemoryBackend {
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        self.check_online()?;
        Ok(self.buckets.lock().unwrap().contains_key(bucket))
    }

    async fn make_bucket(&self, bucket: &str, _region: &str) -> StorageResult<()> {
        self.check_online()?;
        let mut buckets = self.buckets.lock().unwrap();
        if buckets.contains_key(bucket) {
            return Err(StorageError::BucketAlreadyOwned(bucket.to_string()));
        }
        buckets.insert(bucket.to_string(), BTreeMap::new());
        self.bucket_creations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> StorageResult<Vec<FileDescriptor>> {
        self.check_online()?;
        let buckets = self.buckets.lock().unwrap();
        let objects = buckets.get(bucket).ok_or_else(|| Self::missing_bucket(bucket))?;
        Ok(objects
            .iter()
            .map(|(name, object)| FileDescriptor {
                name: name.clone(),
                size: object.body.len() as u64,
                last_modified: object.last_modified,
            })
            .collect())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<String>,
        body: Bytes,
    ) -> StorageResult<()> {
        self.check_online()?;
        let mut buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::missing_bucket(bucket))?;
        objects.insert(
            key.to_string(),
            StoredObject {
                content_type,
                body,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectDownload> {
        self.check_online()?;
        let buckets = self.buckets.lock().unwrap();
        let objects = buckets.get(bucket).ok_or_else(|| Self::missing_bucket(bucket))?;
        let object = objects.get(key).ok_or_else(|| StorageError::ObjectNotFound {
            key: key.to_string(),
        })?;

        let chunks: Vec<io::Result<Bytes>> = vec![Ok(object.body.clone())];
        Ok(ObjectDownload {
            content_type: object.content_type.clone(),
            content_length: Some(object.body.len() as u64),
            body: Box::pin(futures::stream::iter(chunks)),
        })
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.check_online()?;
        let mut buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::missing_bucket(bucket))?;
        objects.remove(key);
        Ok(())
    }
}
