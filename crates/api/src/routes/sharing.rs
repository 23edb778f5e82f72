use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{self, sharing};
use crate::state::AppState;

/// ```text
/// POST    /shared-links           -> create_shared_link (405 otherwise)
/// DELETE  /shared-links/{slug}    -> revoke_shared_link
/// GET     /share/{slug}           -> view_shared (anonymous)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/shared-links",
            post(sharing::create_shared_link).fallback(handlers::post_only),
        )
        .route("/shared-links/{slug}", delete(sharing::revoke_shared_link))
        .route("/share/{slug}", get(sharing::view_shared))
}
