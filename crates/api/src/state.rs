use std::sync::Arc;

use promptshelf_db::RecordStore;
use promptshelf_storage::StorageGateway;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Record store (Postgres or in-memory).
    pub store: Arc<dyn RecordStore>,
    /// Object storage backend.
    pub storage: Arc<dyn StorageGateway>,
    pub config: Arc<ServerConfig>,
}
