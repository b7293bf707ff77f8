use anyhow::{Context, Result};
use clap::Parser;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
#[cfg(test)]
mod test_support;
mod web;

use config::{AppConfig, Args, Command};
use services::{object_backend::S3Backend, storage_service::StorageService};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command.clone() {
        None | Some(Command::Serve) => serve(&args).await,
        Some(command) => {
            let output = cli::run(command, &config::server_url(&args)).await?;
            print!("{}", output);
            Ok(())
        }
    }
}

async fn serve(args: &Args) -> Result<()> {
    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args(args)?;

    tracing::info!("Starting file-gateway with config: {:?}", cfg);

    // --- Initialize storage gateway ---
    let backend = Arc::new(S3Backend::connect(&cfg.store).await);
    let storage = StorageService::new(backend, cfg.store.bucket.clone(), cfg.store.region.clone());
    storage
        .initialize_bucket()
        .await
        .with_context(|| format!("initializing bucket `{}`", cfg.store.bucket))?;

    // --- Build router ---
    let app = routes::routes::app(storage, cfg.max_upload_bytes);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
