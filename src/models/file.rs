//! Represents a file (object) as listed from the bucket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptor of a stored file, produced by the object store on listing.
///
/// The name is the object key and is unique within the bucket. Descriptors
/// are read-only snapshots; nothing in the gateway persists or mutates them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Object key within the bucket.
    pub name: String,

    /// Size in bytes.
    pub size: u64,

    /// Timestamp the store reports as the object's last modification.
    pub last_modified: DateTime<Utc>,
}

/// Body of `GET /api/files`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FileList {
    pub files: Vec<FileDescriptor>,
}
