use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::results;
use crate::state::AppState;

/// ```text
/// GET     /results                 -> list_history
/// GET     /results/signed          -> list_signed_history
/// GET     /results/export.csv      -> export_history
/// POST    /results/batch-delete    -> batch_delete
/// DELETE  /results/{id}            -> delete_result
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/results", get(results::list_history))
        .route("/results/signed", get(results::list_signed_history))
        .route("/results/export.csv", get(results::export_history))
        .route("/results/batch-delete", post(results::batch_delete))
        .route("/results/{id}", delete(results::delete_result))
}
