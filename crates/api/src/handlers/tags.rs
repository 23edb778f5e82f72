//! Handlers for tags and prompt-tag links.
//!
//! All endpoints require authentication via [`AuthUser`] and operate on the
//! caller's own tags only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use promptshelf_core::error::CoreError;
use promptshelf_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::services::prompts::load_owned_prompt;
use crate::services::tag_linking;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TagNameRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub prompt_id: DbId,
    pub tag_id: DbId,
    /// `false` when the link already existed or did not exist.
    pub changed: bool,
}

// ---------------------------------------------------------------------------
// Tag CRUD
// ---------------------------------------------------------------------------

/// GET /api/tags
pub async fn list_tags(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let tags = state.store.list_tags(auth.user_id).await?;
    Ok(Json(DataResponse { data: tags }))
}

/// POST /api/tags
///
/// Find-or-create by name; an existing tag is returned as is.
pub async fn create_tag(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<TagNameRequest>,
) -> AppResult<impl IntoResponse> {
    let tag = tag_linking::ensure_tag(state.store.as_ref(), auth.user_id, &input.name).await?;
    Ok(Json(DataResponse { data: tag }))
}

/// DELETE /api/tags/{id}
///
/// Also removes the tag from every prompt.
pub async fn delete_tag(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(tag_id): Path<DbId>,
) -> AppResult<StatusCode> {
    tag_linking::load_owned_tag(state.store.as_ref(), auth.user_id, tag_id).await?;
    if !state.store.delete_tag(tag_id).await? {
        return Err(CoreError::not_found("Tag", tag_id).into());
    }
    tracing::info!(tag_id, user_id = auth.user_id, "Tag deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/tags/counts
///
/// Tag cloud: per-tag prompt counts with display weights. Unused tags are
/// omitted.
pub async fn tag_counts(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let counts = tag_linking::counts_by_tag(state.store.as_ref(), auth.user_id).await?;
    Ok(Json(DataResponse {
        data: tag_linking::tag_cloud(counts),
    }))
}

/// GET /api/tags/{id}/prompts
pub async fn list_tag_prompts(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(tag_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    tag_linking::load_owned_tag(state.store.as_ref(), auth.user_id, tag_id).await?;
    let prompts = state.store.list_prompts_for_tag(tag_id).await?;
    Ok(Json(DataResponse { data: prompts }))
}

// ---------------------------------------------------------------------------
// Prompt-tag links
// ---------------------------------------------------------------------------

/// POST /api/prompts/{id}/tags
///
/// Ensure a tag by name, then link it.
pub async fn add_prompt_tag(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(prompt_id): Path<DbId>,
    Json(input): Json<TagNameRequest>,
) -> AppResult<impl IntoResponse> {
    let store = state.store.as_ref();
    // Checked before ensure_tag so a foreign prompt never creates a tag.
    load_owned_prompt(store, auth.user_id, prompt_id).await?;
    let tag = tag_linking::ensure_tag(store, auth.user_id, &input.name).await?;
    tag_linking::link(store, auth.user_id, prompt_id, tag.id).await?;
    Ok(Json(DataResponse { data: tag }))
}

/// PUT /api/prompts/{id}/tags/{tag_id}
pub async fn link_prompt_tag(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((prompt_id, tag_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let changed = tag_linking::link(state.store.as_ref(), auth.user_id, prompt_id, tag_id).await?;
    Ok(Json(DataResponse {
        data: LinkResponse {
            prompt_id,
            tag_id,
            changed,
        },
    }))
}

/// DELETE /api/prompts/{id}/tags/{tag_id}
pub async fn unlink_prompt_tag(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((prompt_id, tag_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let changed =
        tag_linking::unlink(state.store.as_ref(), auth.user_id, prompt_id, tag_id).await?;
    Ok(Json(DataResponse {
        data: LinkResponse {
            prompt_id,
            tag_id,
            changed,
        },
    }))
}
