//! Client-side state of the file browser.
//!
//! `FileBrowser` holds what the page shows (the last fetched listing, whether
//! an upload or a fetch is in flight, and the last error) and drives the file
//! API through a `FilesApi` implementation. Every failure collapses to one of
//! three fixed user-facing messages; the cause is only logged.

use crate::models::file::FileDescriptor;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tracing::warn;

pub const FETCH_ERROR: &str = "Error fetching files";
pub const UPLOAD_ERROR: &str = "Error uploading file";
pub const DELETE_ERROR: &str = "Error deleting file";

/// A local file chosen for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// The HTTP contract the browser relies on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FilesApi: Send + Sync {
    /// `GET /api/files`
    async fn list_files(&self) -> anyhow::Result<Vec<FileDescriptor>>;

    /// `POST /api/upload`; any non-2xx status is an error.
    async fn upload(&self, file: UploadFile) -> anyhow::Result<()>;

    /// `DELETE /api/delete/{name}`; any non-2xx status is an error.
    async fn delete(&self, name: &str) -> anyhow::Result<()>;

    /// URL of `GET /api/download/{name}`.
    fn download_url(&self, name: &str) -> String;
}

pub struct FileBrowser {
    api: Arc<dyn FilesApi>,
    pub files: Vec<FileDescriptor>,
    pub uploading: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl FileBrowser {
    /// A browser that has not fetched yet; `loading` starts out set.
    pub fn new(api: Arc<dyn FilesApi>) -> Self {
        Self {
            api,
            files: Vec::new(),
            uploading: false,
            loading: true,
            error: None,
        }
    }

    /// Replace `files` with the current listing.
    ///
    /// On failure `files` keeps its previous value and `error` is set.
    pub async fn fetch_files(&mut self) {
        self.loading = true;
        match self.api.list_files().await {
            Ok(files) => self.files = files,
            Err(err) => {
                warn!("fetching files failed: {:#}", err);
                self.error = Some(FETCH_ERROR.into());
            }
        }
        self.loading = false;
    }

    /// Upload the selected file and refresh the listing once it is stored.
    ///
    /// Does nothing when no file is selected.
    pub async fn handle_upload(&mut self, file: Option<UploadFile>) {
        let Some(file) = file else {
            return;
        };

        self.uploading = true;
        self.error = None;

        match self.api.upload(file).await {
            Ok(()) => self.fetch_files().await,
            Err(err) => {
                warn!("uploading file failed: {:#}", err);
                self.error = Some(UPLOAD_ERROR.into());
            }
        }

        self.uploading = false;
    }

    /// URL to navigate to for downloading `name`.
    pub fn handle_download(&self, name: &str) -> String {
        self.api.download_url(name)
    }

    /// Delete `name` and refresh the listing once the store confirms.
    pub async fn handle_delete(&mut self, name: &str) {
        match self.api.delete(name).await {
            Ok(()) => self.fetch_files().await,
            Err(err) => {
                warn!("deleting {} failed: {:#}", name, err);
                self.error = Some(DELETE_ERROR.into());
            }
        }
    }
}
