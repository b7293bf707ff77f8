use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{env, fmt, path::PathBuf, str::FromStr};

/// Centralized server configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub store: StoreConfig,
}

/// Connection settings for the S3-compatible object store.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub endpoint: String,
    pub port: u16,
    pub use_ssl: bool,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Upload, list, download, and delete files in an S3-compatible bucket"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Host to bind to (overrides FILE_GATEWAY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides FILE_GATEWAY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Largest accepted upload request in bytes (overrides FILE_GATEWAY_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// Gateway base URL used by the client commands (overrides FILE_GATEWAY_URL)
    #[arg(long, global = true)]
    pub server: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// List files in the bucket
    Ls,
    /// Upload a local file
    Put { path: PathBuf },
    /// Download a file
    Get {
        name: String,
        /// Where to write the file (defaults to the file name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a file
    Rm { name: String },
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args(args: &Args) -> Result<Self> {
        Self::resolve(args, |key| env::var(key).ok())
    }

    fn resolve(args: &Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // --- Environment fallback ---
        let env_host = lookup("FILE_GATEWAY_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let env_port = parse_var(&lookup, "FILE_GATEWAY_PORT", 3000)?;
        let env_max_upload =
            parse_var(&lookup, "FILE_GATEWAY_MAX_UPLOAD_BYTES", 100 * 1024 * 1024)?;

        // --- Merge ---
        Ok(Self {
            host: args.host.clone().unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max_upload),
            store: StoreConfig::resolve(&lookup)?,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StoreConfig {
    fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            endpoint: lookup("MINIO_ENDPOINT").unwrap_or_else(|| "localhost".into()),
            port: parse_var(&lookup, "MINIO_PORT", 9000)?,
            use_ssl: lookup("MINIO_USE_SSL").as_deref() == Some("true"),
            access_key: lookup("MINIO_ACCESS_KEY").unwrap_or_else(|| "minioadmin".into()),
            secret_key: lookup("MINIO_SECRET_KEY").unwrap_or_else(|| "minioadmin".into()),
            bucket: lookup("MINIO_BUCKET_NAME").unwrap_or_else(|| "test-bucket".into()),
            region: lookup("MINIO_REGION").unwrap_or_else(|| "us-east-1".into()),
        })
    }

    pub fn endpoint_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.endpoint, self.port)
    }
}

// Keeps the secret key out of startup logs.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("endpoint", &self.endpoint)
            .field("port", &self.port)
            .field("use_ssl", &self.use_ssl)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .finish()
    }
}

/// Base URL the client commands talk to.
pub fn server_url(args: &Args) -> String {
    args.server
        .clone()
        .or_else(|| env::var("FILE_GATEWAY_URL").ok())
        .unwrap_or_else(|| "http://localhost:3000".into())
}

fn parse_var<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        None => Ok(default),
    }
}
