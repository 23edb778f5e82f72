//! Route definitions for the `/tags` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::tags;
use crate::state::AppState;

/// Routes mounted at `/tags`.
///
/// ```text
/// GET, POST  /                -> list_tags, create_tag
/// GET        /counts          -> tag_counts
/// DELETE     /{id}            -> delete_tag
/// GET        /{id}/prompts    -> list_tag_prompts
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tags::list_tags).post(tags::create_tag))
        .route("/counts", get(tags::tag_counts))
        .route("/{id}", delete(tags::delete_tag))
        .route("/{id}/prompts", get(tags::list_tag_prompts))
}
