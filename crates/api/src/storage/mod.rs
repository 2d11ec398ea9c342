//! File storage for uploads.
//!
//! Uploaded files are written through a [`Storage`] backend: a local
//! directory served under `/media`, or an S3-compatible bucket. Backends
//! return the public URL of the stored object.

pub mod local;
pub mod media;
pub mod s3;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

pub use local::LocalStorage;
pub use media::{sniff_media_type, MediaType, MAX_IMAGE_SIZE};
pub use s3::S3Storage;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 error: {0}")]
    S3(String),
}

/// A place uploaded files are written to.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `content` under `name` and return its public URL.
    async fn save(
        &self,
        name: &str,
        content: &[u8],
        media_type: &str,
    ) -> Result<String, StorageError>;
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    /// Prefix of object URLs handed to clients.
    pub public_url: String,
}

#[derive(Debug, Clone)]
pub enum StorageConfig {
    Local { root: PathBuf, public_url: String },
    S3(S3Config),
}

impl StorageConfig {
    /// | Env Var              | Default                                   |
    /// |----------------------|-------------------------------------------|
    /// | `STORAGE_BACKEND`    | `local` (`local` or `s3`)                 |
    /// | `STORAGE_ROOT`       | `./media`                                 |
    /// | `STORAGE_PUBLIC_URL` | `/media` (local), `{endpoint}/{bucket}` (s3) |
    /// | `S3_BUCKET`          | required for s3                           |
    /// | `S3_ENDPOINT`        | AWS                                       |
    /// | `S3_REGION`          | `us-east-1`                               |
    /// | `S3_ACCESS_KEY`      | required for s3                           |
    /// | `S3_SECRET_KEY`      | required for s3                           |
    ///
    /// # Panics
    ///
    /// Panics on an unknown backend or missing S3 credentials.
    pub fn from_env() -> Self {
        let backend = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "local".into());
        let public_url = std::env::var("STORAGE_PUBLIC_URL").ok();
        match backend.as_str() {
            "local" => StorageConfig::Local {
                root: std::env::var("STORAGE_ROOT")
                    .unwrap_or_else(|_| "./media".into())
                    .into(),
                public_url: public_url.unwrap_or_else(|| "/media".into()),
            },
            "s3" => {
                let bucket = std::env::var("S3_BUCKET").expect("S3_BUCKET must be set");
                let endpoint = std::env::var("S3_ENDPOINT").ok();
                let region = std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into());
                let public_url = public_url.unwrap_or_else(|| match &endpoint {
                    Some(endpoint) => format!("{}/{bucket}", endpoint.trim_end_matches('/')),
                    None => format!("https://{bucket}.s3.{region}.amazonaws.com"),
                });
                StorageConfig::S3(S3Config {
                    bucket,
                    endpoint,
                    region,
                    access_key: std::env::var("S3_ACCESS_KEY").expect("S3_ACCESS_KEY must be set"),
                    secret_key: std::env::var("S3_SECRET_KEY").expect("S3_SECRET_KEY must be set"),
                    public_url,
                })
            }
            other => panic!("Unknown STORAGE_BACKEND '{other}'; expected local or s3"),
        }
    }
}

/// Construct the configured backend.
pub fn build_storage(config: &StorageConfig) -> Arc<dyn Storage> {
    match config {
        StorageConfig::Local { root, public_url } => {
            Arc::new(LocalStorage::new(root.clone(), public_url.clone()))
        }
        StorageConfig::S3(s3) => Arc::new(S3Storage::new(s3)),
    }
}
