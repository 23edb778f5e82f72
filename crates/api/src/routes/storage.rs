use axum::routing::get;
use axum::Router;

use crate::handlers::storage;
use crate::state::AppState;

/// Signed object downloads for the local backend (root level).
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/storage/v1/object/sign/{bucket}/{*key}",
        get(storage::serve_signed_object),
    )
}
