//! Route definitions for prompts and their nested resources.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{self, prompts, results, tags};
use crate::state::AppState;

/// ```text
/// POST                /prompts                         -> create_prompt (405 otherwise)
/// GET                 /dashboard/prompts               -> list_prompts
/// GET, PUT, DELETE    /prompts/{id}                    -> get, update, delete
/// GET, POST           /prompts/{id}/results            -> list, create text result
/// POST                /prompts/{id}/results/upload     -> upload_result
/// POST                /prompts/{id}/results/batch      -> upload_batch
/// POST                /prompts/{id}/tags               -> add_prompt_tag
/// PUT, DELETE         /prompts/{id}/tags/{tag_id}      -> link, unlink
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/prompts",
            post(prompts::create_prompt).fallback(handlers::post_only),
        )
        .route("/dashboard/prompts", get(prompts::list_prompts))
        .route(
            "/prompts/{id}",
            get(prompts::get_prompt)
                .put(prompts::update_prompt)
                .delete(prompts::delete_prompt),
        )
        .route(
            "/prompts/{id}/results",
            get(results::list_prompt_results).post(results::create_text_result),
        )
        .route("/prompts/{id}/results/upload", post(results::upload_result))
        .route("/prompts/{id}/results/batch", post(results::upload_batch))
        .route("/prompts/{id}/tags", post(tags::add_prompt_tag))
        .route(
            "/prompts/{id}/tags/{tag_id}",
            put(tags::link_prompt_tag).delete(tags::unlink_prompt_tag),
        )
}
