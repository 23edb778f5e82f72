//! Handlers for results: per-prompt lists, uploads, upload history, export
//! and deletion.

use std::time::Duration;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use promptshelf_core::error::CoreError;
use promptshelf_core::export::export_file_name;
use promptshelf_core::types::{DbId, SortOrder};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::HistoryParams;
use crate::response::DataResponse;
use crate::services::prompts::load_owned_prompt;
use crate::services::results::{self, UploadedFile};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderParams {
    #[serde(default)]
    pub order: Option<SortOrder>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTextResultRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchDeleteRequest {
    #[serde(default)]
    pub ids: Vec<DbId>,
}

#[derive(Debug, Serialize)]
pub struct BatchDeleteResponse {
    pub deleted: u64,
}

// ---------------------------------------------------------------------------
// Per-prompt
// ---------------------------------------------------------------------------

/// GET /api/prompts/{id}/results
///
/// Oldest first unless `order=desc`.
pub async fn list_prompt_results(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(prompt_id): Path<DbId>,
    Query(params): Query<OrderParams>,
) -> AppResult<impl IntoResponse> {
    load_owned_prompt(state.store.as_ref(), auth.user_id, prompt_id).await?;
    let results = state
        .store
        .list_results_for_prompt(prompt_id, params.order.unwrap_or(SortOrder::Asc))
        .await?;
    Ok(Json(DataResponse { data: results }))
}

/// POST /api/prompts/{id}/results
pub async fn create_text_result(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(prompt_id): Path<DbId>,
    Json(input): Json<CreateTextResultRequest>,
) -> AppResult<impl IntoResponse> {
    let result =
        results::create_text_result(state.store.as_ref(), auth.user_id, prompt_id, &input.content)
            .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: result })))
}

/// POST /api/prompts/{id}/results/upload
///
/// Multipart form with one `file` field.
pub async fn upload_result(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(prompt_id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let file = read_files(multipart)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    let result = results::upload_image(
        state.store.as_ref(),
        state.storage.as_ref(),
        auth.user_id,
        prompt_id,
        file,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: result })))
}

/// POST /api/prompts/{id}/results/batch
///
/// Multipart form with any number of `file`/`files` fields. Responds 200
/// with one outcome per file even when some of them failed.
pub async fn upload_batch(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(prompt_id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let files = read_files(multipart).await?;
    let outcomes = results::upload_batch(
        state.store.as_ref(),
        state.storage.as_ref(),
        auth.user_id,
        prompt_id,
        files,
    )
    .await?;
    Ok(Json(DataResponse { data: outcomes }))
}

// ---------------------------------------------------------------------------
// Upload history
// ---------------------------------------------------------------------------

/// GET /api/results
pub async fn list_history(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<impl IntoResponse> {
    let query = params.to_result_query()?;
    let results = state.store.list_results_for_owner(auth.user_id, &query).await?;
    Ok(Json(DataResponse { data: results }))
}

/// GET /api/results/signed
///
/// Same filters as the history plus `expiry_minutes` for the URL lifetime.
pub async fn list_signed_history(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<impl IntoResponse> {
    let ttl = Duration::from_secs(params.expiry_secs()?);
    let query = params.to_result_query()?;
    let found = state.store.list_results_for_owner(auth.user_id, &query).await?;
    let signed = results::sign_results(state.storage.as_ref(), found, ttl).await;
    Ok(Json(DataResponse { data: signed }))
}

/// GET /api/results/export.csv
pub async fn export_history(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<impl IntoResponse> {
    let query = params.to_result_query()?;
    let found = state.store.list_results_for_owner(auth.user_id, &query).await?;
    let csv = results::export_csv(&found)
        .ok_or_else(|| CoreError::not_found("Export", "upload history"))?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(chrono::Utc::now())
    );
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

/// POST /api/results/batch-delete
pub async fn batch_delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<BatchDeleteRequest>,
) -> AppResult<impl IntoResponse> {
    let deleted = results::batch_delete(
        state.store.as_ref(),
        state.storage.as_ref(),
        auth.user_id,
        &input.ids,
    )
    .await?;
    Ok(Json(DataResponse {
        data: BatchDeleteResponse { deleted },
    }))
}

/// DELETE /api/results/{id}
///
/// Storage object first; if that fails the row is kept and 502 returned.
pub async fn delete_result(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(result_id): Path<DbId>,
) -> AppResult<StatusCode> {
    results::delete_result(
        state.store.as_ref(),
        state.storage.as_ref(),
        auth.user_id,
        result_id,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Collect every `file`/`files` field; other fields are ignored.
async fn read_files(mut multipart: Multipart) -> AppResult<Vec<UploadedFile>> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" && name != "files" {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        files.push(UploadedFile {
            file_name,
            bytes: bytes.to_vec(),
        });
    }
    Ok(files)
}
