use promptshelf_core::sharing::{
    is_supported_slug_length, DEFAULT_MAX_SLUG_ATTEMPTS, DEFAULT_SIGNED_URL_TTL_SECS,
    DEFAULT_SLUG_LENGTH, MAX_SLUG_LENGTH, MIN_SLUG_LENGTH,
};
use promptshelf_storage::StorageConfig;

use crate::auth::jwt::JwtConfig;

/// Default multipart body limit (20 MiB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Which [`RecordStore`](promptshelf_db::RecordStore) backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Request body limit for uploads.
    pub max_upload_bytes: usize,
    pub store_backend: StoreBackend,
    /// Required when `store_backend` is `Postgres`.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub sharing: SharingConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `3000`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `MAX_UPLOAD_BYTES`     | `20971520`              |
    /// | `STORE_BACKEND`        | `postgres`              |
    /// | `DATABASE_URL`         | required for `postgres` |
    ///
    /// JWT, storage and sharing settings are read by their own `from_env`.
    ///
    /// # Panics
    ///
    /// Panics on unparsable values, an unknown `STORE_BACKEND`, or a missing
    /// `DATABASE_URL` with the Postgres backend.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let store_backend = match std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".into())
            .as_str()
        {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => panic!("STORE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        };

        let database_url = std::env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres {
            assert!(
                database_url.is_some(),
                "DATABASE_URL must be set when STORE_BACKEND=postgres"
            );
        }

        let jwt = JwtConfig::from_env();
        let storage = StorageConfig::from_env(&jwt.secret);
        let sharing = SharingConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            store_backend,
            database_url,
            jwt,
            storage,
            sharing,
        }
    }
}

/// Settings for share slugs and the signed URLs handed out with them.
#[derive(Debug, Clone)]
pub struct SharingConfig {
    /// Characters per slug.
    pub slug_length: usize,
    /// Insert attempts before giving up on slug collisions.
    pub max_slug_attempts: u32,
    /// Lifetime of signed URLs in shared views.
    pub signed_url_ttl_secs: u64,
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            slug_length: DEFAULT_SLUG_LENGTH,
            max_slug_attempts: DEFAULT_MAX_SLUG_ATTEMPTS,
            signed_url_ttl_secs: DEFAULT_SIGNED_URL_TTL_SECS,
        }
    }
}

impl SharingConfig {
    /// | Env Var                   | Default |
    /// |---------------------------|---------|
    /// | `SHARE_SLUG_LENGTH`       | `10`    |
    /// | `SHARE_MAX_SLUG_ATTEMPTS` | `5`     |
    /// | `SIGNED_URL_TTL_SECS`     | `3600`  |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let slug_length: usize = std::env::var("SHARE_SLUG_LENGTH")
            .map(|v| v.parse().expect("SHARE_SLUG_LENGTH must be a valid usize"))
            .unwrap_or(defaults.slug_length);
        assert!(
            is_supported_slug_length(slug_length),
            "SHARE_SLUG_LENGTH must be between {MIN_SLUG_LENGTH} and {MAX_SLUG_LENGTH}"
        );

        let max_slug_attempts: u32 = std::env::var("SHARE_MAX_SLUG_ATTEMPTS")
            .map(|v| v.parse().expect("SHARE_MAX_SLUG_ATTEMPTS must be a valid u32"))
            .unwrap_or(defaults.max_slug_attempts);
        assert!(max_slug_attempts > 0, "SHARE_MAX_SLUG_ATTEMPTS must be positive");

        let signed_url_ttl_secs: u64 = std::env::var("SIGNED_URL_TTL_SECS")
            .map(|v| v.parse().expect("SIGNED_URL_TTL_SECS must be a valid u64"))
            .unwrap_or(defaults.signed_url_ttl_secs);
        assert!(signed_url_ttl_secs > 0, "SIGNED_URL_TTL_SECS must be positive");

        Self {
            slug_length,
            max_slug_attempts,
            signed_url_ttl_secs,
        }
    }
}
