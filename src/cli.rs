//! Terminal front-end for the file browser.
//!
//! Each subcommand drives a `FileBrowser` against a running gateway and then
//! prints the refreshed listing, or fails with the browser's error message.

use crate::{
    config::Command,
    models::file::FileDescriptor,
    web::{
        browser::{FileBrowser, UploadFile},
        format::format_file_size,
        http_api::HttpFilesApi,
    },
};
use anyhow::{Context, Result, bail};
use bytes::Bytes;
use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::fs;
use tracing::info;

/// Run a client subcommand and return what it prints on success.
pub async fn run(command: Command, server: &str) -> Result<String> {
    let api = Arc::new(HttpFilesApi::new(server)?);
    let mut browser = FileBrowser::new(api);

    match command {
        Command::Serve => bail!("`serve` is not a client command"),
        Command::Ls => browser.fetch_files().await,
        Command::Put { path } => {
            let file = read_upload(&path).await?;
            browser.handle_upload(Some(file)).await;
        }
        Command::Get { name, output } => {
            let output = output.unwrap_or_else(|| default_output(&name));
            download(&browser.handle_download(&name), &output).await?;
            return Ok(format!("saved {} to {}\n", name, output.display()));
        }
        Command::Rm { name } => browser.handle_delete(&name).await,
    }

    if let Some(error) = browser.error {
        bail!(error);
    }
    Ok(render_listing(&browser.files))
}

/// Plain-text listing: name, size, and last modification time per line.
pub fn render_listing(files: &[FileDescriptor]) -> String {
    if files.is_empty() {
        return "No files uploaded yet\n".into();
    }

    let width = files
        .iter()
        .map(|f| f.name.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for file in files {
        let _ = writeln!(
            out,
            "{:<width$}  {:>10}  {}",
            file.name,
            format_file_size(file.size),
            file.last_modified.format("%Y-%m-%d %H:%M:%S"),
            width = width
        );
    }
    out
}

async fn read_upload(path: &Path) -> Result<UploadFile> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("`{}` has no file name", path.display()))?;
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    Ok(UploadFile {
        name,
        content_type: None,
        bytes: Bytes::from(bytes),
    })
}

fn default_output(name: &str) -> PathBuf {
    PathBuf::from(name.rsplit('/').next().unwrap_or(name))
}

async fn download(url: &str, output: &Path) -> Result<()> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("requesting {}", url))?
        .error_for_status()?;
    let bytes = response.bytes().await?;
    fs::write(output, &bytes)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    info!("downloaded {} bytes to {}", bytes.len(), output.display());
    Ok(())
}
