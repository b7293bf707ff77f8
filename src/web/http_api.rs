use crate::{
    models::file::{FileDescriptor, FileList},
    web::browser::{FilesApi, UploadFile},
};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::{
    Client, Url,
    multipart::{Form, Part},
};

/// `FilesApi` over HTTP, talking to a running gateway.
pub struct HttpFilesApi {
    client: Client,
    base: Url,
}

impl HttpFilesApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("parsing server URL `{}`", base_url))?;
        if base.cannot_be_a_base() {
            bail!("server URL `{}` cannot carry a path", base_url);
        }

        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl FilesApi for HttpFilesApi {
    async fn list_files(&self) -> Result<Vec<FileDescriptor>> {
        let url = self.endpoint(&["api", "files"]);
        let list: FileList = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("decoding file listing")?;
        Ok(list.files)
    }

    async fn upload(&self, file: UploadFile) -> Result<()> {
        let mut part = Part::bytes(file.bytes.to_vec()).file_name(file.name);
        if let Some(content_type) = file.content_type {
            part = part.mime_str(&content_type)?;
        }
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint(&["api", "upload"]))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("upload failed with status {}", response.status());
        }
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.endpoint(&["api", "delete", name]))
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("delete failed with status {}", response.status());
        }
        Ok(())
    }

    fn download_url(&self, name: &str) -> String {
        self.endpoint(&["api", "download", name]).to_string()
    }
}
