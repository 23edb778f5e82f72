//! Handlers for prompts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use promptshelf_core::error::CoreError;
use promptshelf_core::types::DbId;
use promptshelf_db::models::prompt::PromptQuery;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::services::prompts;
use crate::state::AppState;

/// Request body for `POST /api/prompts`.
///
/// `user_id` is accepted for compatibility with older clients but must match
/// the session.
#[derive(Debug, Deserialize)]
pub struct CreatePromptRequest {
    pub user_id: Option<DbId>,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Request body for `PUT /api/prompts/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdatePromptRequest {
    pub title: Option<String>,
    pub content: String,
}

/// POST /api/prompts
///
/// Responds with the created rows as a bare array.
pub async fn create_prompt(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePromptRequest>,
) -> AppResult<impl IntoResponse> {
    if input.user_id.is_some_and(|id| id != auth.user_id) {
        return Err(CoreError::Forbidden("user_id does not match the session".into()).into());
    }
    let content = input.content.as_deref().unwrap_or_default();
    let prompt =
        prompts::create_prompt(state.store.as_ref(), auth.user_id, input.title.as_deref(), content)
            .await?;
    Ok(Json(vec![prompt]))
}

/// GET /api/dashboard/prompts
///
/// The caller's prompts, newest first by default. Supports `tag_id`, `q`
/// (title/content search) and `order`.
pub async fn list_prompts(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PromptQuery>,
) -> AppResult<impl IntoResponse> {
    let prompts = state.store.list_prompts(auth.user_id, &params).await?;
    Ok(Json(DataResponse { data: prompts }))
}

/// GET /api/prompts/{id}
///
/// Prompt with its results (oldest first), tags and shared links.
pub async fn get_prompt(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(prompt_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let detail = prompts::prompt_detail(state.store.as_ref(), auth.user_id, prompt_id).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/prompts/{id}
pub async fn update_prompt(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(prompt_id): Path<DbId>,
    Json(input): Json<UpdatePromptRequest>,
) -> AppResult<impl IntoResponse> {
    let prompt = prompts::update_prompt(
        state.store.as_ref(),
        auth.user_id,
        prompt_id,
        input.title.as_deref(),
        &input.content,
    )
    .await?;
    Ok(Json(DataResponse { data: prompt }))
}

/// DELETE /api/prompts/{id}
///
/// Removes stored images, then the prompt and everything attached to it.
pub async fn delete_prompt(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(prompt_id): Path<DbId>,
) -> AppResult<StatusCode> {
    prompts::delete_prompt(
        state.store.as_ref(),
        state.storage.as_ref(),
        auth.user_id,
        prompt_id,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
