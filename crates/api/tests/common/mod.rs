#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use promptshelf_api::auth::jwt::{generate_access_token, JwtConfig};
use promptshelf_api::config::{ServerConfig, SharingConfig, StoreBackend};
use promptshelf_api::router::build_app_router;
use promptshelf_api::state::AppState;
use promptshelf_core::types::DbId;
use promptshelf_db::models::user::NewUser;
use promptshelf_db::{MemoryStore, RecordStore};
use promptshelf_storage::{
    LocalStorage, ObjectBody, StorageConfig, StorageError, StorageGateway, StoredObject,
};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PUBLIC_BASE_URL: &str = "http://localhost:3000";
pub const BOUNDARY: &str = "promptshelf-test-boundary";

/// Smallest byte string `image::guess_format` recognizes as PNG.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";

/// A router over an in-memory store and a local storage root that lives as
/// long as this value.
pub struct TestApp {
    pub state: AppState,
    dir: TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        build_app_router(self.state.clone(), &self.state.config)
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.state.store.as_ref()
    }

    /// On-disk path of a stored object.
    pub fn object_path(&self, key: &str) -> PathBuf {
        self.dir.path().join("results").join(key)
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(storage_root: &std::path::Path) -> ServerConfig {
    let jwt = JwtConfig {
        secret: "integration-test-secret".to_string(),
        access_token_expiry_mins: 60,
    };
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
        store_backend: StoreBackend::Memory,
        database_url: None,
        storage: StorageConfig::local(storage_root, PUBLIC_BASE_URL, "storage-test-secret"),
        jwt,
        sharing: SharingConfig::default(),
    }
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(|storage| storage)
}

/// Like [`build_test_app`] but lets the caller wrap the storage gateway.
pub fn build_test_app_with(
    wrap: impl FnOnce(Arc<dyn StorageGateway>) -> Arc<dyn StorageGateway>,
) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let storage: Arc<dyn StorageGateway> = Arc::new(LocalStorage::new(&config.storage));

    TestApp {
        state: AppState {
            store: Arc::new(MemoryStore::new()),
            storage: wrap(storage),
            config: Arc::new(config),
        },
        dir,
    }
}

/// Insert a user directly and mint a token for it.
pub async fn seed_user(app: &TestApp, email: &str) -> (DbId, String) {
    let user = app
        .store()
        .create_user(&NewUser {
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
        })
        .await
        .unwrap();
    let token = generate_access_token(user.id, &user.email, &app.state.config.jwt)
        .unwrap()
        .token;
    (user.id, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
}

pub async fn send(app: Router, req: Request<Body>) -> Response {
    app.oneshot(req).await.unwrap()
}

pub async fn get(app: Router, uri: &str, token: Option<&str>) -> Response {
    send(app, request(Method::GET, uri, token).body(Body::empty()).unwrap()).await
}

pub async fn delete(app: Router, uri: &str, token: Option<&str>) -> Response {
    send(app, request(Method::DELETE, uri, token).body(Body::empty()).unwrap()).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response {
    json_request(app, Method::POST, uri, token, body).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response {
    json_request(app, Method::PUT, uri, token, body).await
}

async fn json_request(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response {
    let req = request(method, uri, token)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

/// POST a multipart form. Each file is `(field name, file name, bytes)`.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    token: Option<&str>,
    files: &[(&str, &str, &[u8])],
) -> Response {
    let mut body = Vec::new();
    for (field, file_name, bytes) in files {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let req = request(Method::POST, uri, token)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, req).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Create a prompt through the API and return its id.
pub async fn create_prompt(app: &TestApp, token: &str, content: &str) -> DbId {
    let response = post_json(
        app.router(),
        "/api/prompts",
        Some(token),
        serde_json::json!({ "content": content }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await[0]["id"].as_i64().unwrap()
}

/// Path and query of an absolute URL issued under [`PUBLIC_BASE_URL`].
pub fn local_path(url: &str) -> &str {
    url.strip_prefix(PUBLIC_BASE_URL).unwrap()
}

// ---------------------------------------------------------------------------
// Storage doubles
// ---------------------------------------------------------------------------

/// Delegates everything except `remove`, which always fails.
pub struct FailingRemoveStorage {
    pub inner: Arc<dyn StorageGateway>,
}

#[async_trait]
impl StorageGateway for FailingRemoveStorage {
    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    fn public_url(&self, key: &str) -> String {
        self.inner.public_url(key)
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        self.inner.put(key, bytes, content_type).await
    }

    async fn remove(&self, keys: &[String]) -> Result<(), StorageError> {
        Err(StorageError::Delete {
            keys: keys.to_vec(),
            message: "simulated outage".to_string(),
        })
    }

    async fn sign(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        self.inner.sign(key, ttl).await
    }

    async fn read(&self, key: &str) -> Result<ObjectBody, StorageError> {
        self.inner.read(key).await
    }
}
