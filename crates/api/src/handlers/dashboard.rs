//! Browser entry point behind the session guard.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use promptshelf_core::types::DbId;
use promptshelf_db::models::prompt::PromptQuery;
use promptshelf_db::models::result::ResultQuery;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::session::RequireSession;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub user_id: DbId,
    pub email: String,
    pub prompt_count: usize,
    pub tag_count: usize,
    pub result_count: usize,
}

/// GET /dashboard
///
/// Signed-out visitors get a 303 to the login view before any of this runs.
pub async fn dashboard(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let prompts = state
        .store
        .list_prompts(user.user_id, &PromptQuery::default())
        .await?;
    let tags = state.store.list_tags(user.user_id).await?;
    let results = state
        .store
        .list_results_for_owner(user.user_id, &ResultQuery::default())
        .await?;

    Ok(Json(DataResponse {
        data: DashboardSummary {
            user_id: user.user_id,
            email: user.email,
            prompt_count: prompts.len(),
            tag_count: tags.len(),
            result_count: results.len(),
        },
    }))
}
