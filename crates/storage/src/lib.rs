//! Object storage gateway.
//!
//! [`StorageGateway`] is the only way the rest of the workspace touches
//! stored bytes. Two backends implement it:
//!
//! - [`LocalStorage`]: files under `{root}/{bucket}/{key}`, signed URLs are
//!   HMAC tokens verified by the API's storage route.
//! - [`S3Storage`]: an S3-compatible bucket, signed URLs are presigned GETs.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncRead;

pub mod config;
pub mod local;
pub mod s3;

pub use config::{StorageBackend, StorageConfig};
pub use local::LocalStorage;
pub use s3::S3Storage;

/// Failure reported by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to store object '{key}': {message}")]
    Write { key: String, message: String },

    #[error("Failed to delete objects: {message}")]
    Delete { keys: Vec<String>, message: String },

    #[error("Object '{0}' does not exist")]
    NotFound(String),

    #[error("Failed to sign object '{key}': {message}")]
    Sign { key: String, message: String },

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Failed to read object '{key}': {message}")]
    Read { key: String, message: String },
}

/// Outcome of a successful [`StorageGateway::put`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub public_url: String,
    pub size: u64,
}

/// A readable object body.
pub struct ObjectBody {
    pub reader: Pin<Box<dyn AsyncRead + Send>>,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
}

impl std::fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectBody")
            .field("content_length", &self.content_length)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Bucket every key lives in.
    fn bucket(&self) -> &str;

    /// Public URL of `key`. Does not check that the object exists.
    fn public_url(&self, key: &str) -> String;

    /// Store `bytes` under `key`, replacing any existing object.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;

    /// Delete every key. Keys that are already gone count as deleted; any
    /// other failure fails the whole call with [`StorageError::Delete`].
    async fn remove(&self, keys: &[String]) -> Result<(), StorageError>;

    /// Issue a read URL valid for `ttl`. Missing objects yield
    /// [`StorageError::NotFound`].
    async fn sign(&self, key: &str, ttl: Duration) -> Result<String, StorageError>;

    /// Open an object for streaming.
    async fn read(&self, key: &str) -> Result<ObjectBody, StorageError>;
}

/// Build the configured backend.
pub async fn connect(config: &StorageConfig) -> Arc<dyn StorageGateway> {
    match config.backend {
        StorageBackend::Local => {
            tracing::info!(root = %config.root.display(), bucket = %config.bucket, "Using local storage");
            Arc::new(LocalStorage::new(config))
        }
        StorageBackend::S3 => {
            tracing::info!(bucket = %config.bucket, region = %config.s3_region, "Using S3 storage");
            Arc::new(S3Storage::connect(config).await)
        }
    }
}
