//! Handlers for shared links and the anonymous shared view.

use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use promptshelf_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::services::sharing;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSharedLinkRequest {
    pub prompt_id: Option<DbId>,
}

#[derive(Debug, Serialize)]
pub struct SlugResponse {
    pub slug: String,
}

/// POST /api/shared-links
///
/// Responds with a bare `{slug}` object.
pub async fn create_shared_link(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSharedLinkRequest>,
) -> AppResult<impl IntoResponse> {
    let prompt_id = input
        .prompt_id
        .ok_or_else(|| AppError::BadRequest("prompt_id is required".into()))?;
    let link = sharing::create_link(
        state.store.as_ref(),
        auth.user_id,
        prompt_id,
        &state.config.sharing,
    )
    .await?;
    Ok(Json(SlugResponse { slug: link.slug }))
}

/// DELETE /api/shared-links/{slug}
pub async fn revoke_shared_link(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    sharing::revoke_link(state.store.as_ref(), auth.user_id, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/share/{slug}
///
/// Anonymous. The slug is the credential.
pub async fn view_shared(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let ttl = Duration::from_secs(state.config.sharing.signed_url_ttl_secs);
    let view = sharing::resolve(state.store.as_ref(), state.storage.as_ref(), &slug, ttl).await?;
    Ok(Json(DataResponse { data: view }))
}
