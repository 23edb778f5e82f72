pub mod auth;
pub mod dashboard;
pub mod health;
pub mod prompts;
pub mod results;
pub mod sharing;
pub mod storage;
pub mod tags;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                                     signup (public)
/// /auth/login                                      login (public)
/// /auth/me                                         current identity
/// /auth/update-password                            change password
///
/// /prompts                                         create (POST only)
/// /prompts/{id}                                    get, update, delete
/// /prompts/{id}/results                            list, create text result
/// /prompts/{id}/results/upload                     upload one image
/// /prompts/{id}/results/batch                      upload many images
/// /prompts/{id}/tags                               ensure tag by name + link
/// /prompts/{id}/tags/{tag_id}                      link (PUT), unlink (DELETE)
/// /dashboard/prompts                               owner's prompt list
///
/// /results                                         upload history
/// /results/signed                                  history with signed URLs
/// /results/export.csv                              CSV export
/// /results/batch-delete                            delete many (POST)
/// /results/{id}                                    delete
///
/// /tags                                            list, create
/// /tags/counts                                     tag cloud
/// /tags/{id}                                       delete
/// /tags/{id}/prompts                               prompts carrying a tag
///
/// /shared-links                                    create (POST only)
/// /shared-links/{slug}                             revoke
/// /share/{slug}                                    shared view (anonymous)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(prompts::router())
        .merge(results::router())
        .nest("/tags", tags::router())
        .merge(sharing::router())
}
