use std::path::PathBuf;

use promptshelf_core::storage::DEFAULT_BUCKET;

/// Which backend stores objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    S3,
}

impl StorageBackend {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "local" => Some(Self::Local),
            "s3" => Some(Self::S3),
            _ => None,
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    /// Root directory of the local backend.
    pub root: PathBuf,
    /// Base of public and locally signed URLs.
    pub public_base_url: String,
    /// HMAC key for locally signed URLs.
    pub signing_secret: String,
    pub s3_region: String,
    pub s3_endpoint: Option<String>,
    /// Static credentials; the default AWS chain is used when unset.
    pub s3_access_key_id: Option<String>,
    pub s3_secret_access_key: Option<String>,
}

impl StorageConfig {
    /// Load from environment variables.
    ///
    /// | Env var                  | Default                 |
    /// |--------------------------|-------------------------|
    /// | `STORAGE_BACKEND`        | `local`                 |
    /// | `STORAGE_BUCKET`         | `results`               |
    /// | `STORAGE_ROOT`           | `./data/storage`        |
    /// | `PUBLIC_BASE_URL`        | `http://localhost:3000` |
    /// | `STORAGE_SIGNING_SECRET` | `fallback_secret`       |
    /// | `S3_REGION`              | `us-east-1`             |
    /// | `S3_ENDPOINT`            | unset                   |
    /// | `S3_ACCESS_KEY_ID`       | unset                   |
    /// | `S3_SECRET_ACCESS_KEY`   | unset                   |
    ///
    /// # Panics
    ///
    /// Panics if `STORAGE_BACKEND` names an unknown backend.
    pub fn from_env(fallback_secret: &str) -> Self {
        let backend_name = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "local".into());
        let backend = StorageBackend::from_name(&backend_name)
            .unwrap_or_else(|| panic!("STORAGE_BACKEND must be 'local' or 's3', got '{backend_name}'"));

        Self {
            backend,
            bucket: std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.into()),
            root: std::env::var("STORAGE_ROOT")
                .unwrap_or_else(|_| "./data/storage".into())
                .into(),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            signing_secret: std::env::var("STORAGE_SIGNING_SECRET")
                .unwrap_or_else(|_| fallback_secret.to_string()),
            s3_region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
            s3_endpoint: std::env::var("S3_ENDPOINT").ok(),
            s3_access_key_id: std::env::var("S3_ACCESS_KEY_ID").ok(),
            s3_secret_access_key: std::env::var("S3_SECRET_ACCESS_KEY").ok(),
        }
    }

    /// Local-backend settings rooted at `root`, for tests and tooling.
    pub fn local(root: impl Into<PathBuf>, public_base_url: &str, signing_secret: &str) -> Self {
        Self {
            backend: StorageBackend::Local,
            bucket: DEFAULT_BUCKET.to_string(),
            root: root.into(),
            public_base_url: public_base_url.to_string(),
            signing_secret: signing_secret.to_string(),
            s3_region: "us-east-1".to_string(),
            s3_endpoint: None,
            s3_access_key_id: None,
            s3_secret_access_key: None,
        }
    }
}
