//! Serves objects of the local storage backend behind signed URLs.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use promptshelf_core::error::CoreError;
use promptshelf_core::signing::verify_object;
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignedObjectParams {
    pub token: Option<String>,
}

/// GET /storage/v1/object/sign/{bucket}/{*key}?token=
///
/// A missing, forged or expired token is 403; a valid token for a deleted
/// object is 404.
pub async fn serve_signed_object(
    State(state): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
    Query(params): Query<SignedObjectParams>,
) -> AppResult<Response> {
    let denied = || CoreError::Forbidden("Invalid or expired signature".into());

    let token = params.token.ok_or_else(denied)?;
    if bucket != state.storage.bucket() {
        return Err(denied().into());
    }
    let now = chrono::Utc::now().timestamp();
    verify_object(
        state.config.storage.signing_secret.as_bytes(),
        &bucket,
        &key,
        &token,
        now,
    )
    .map_err(|e| {
        tracing::debug!(key = %key, reason = %e, "Signed URL refused");
        denied()
    })?;

    let object = state.storage.read(&key).await?;
    let content_type = object.content_type.clone().unwrap_or_else(|| {
        image::ImageFormat::from_path(&key)
            .map(|f| f.to_mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string())
    });

    let mut response = (
        [
            (CONTENT_TYPE, content_type),
            (CACHE_CONTROL, "private, max-age=60".to_string()),
        ],
        Body::from_stream(ReaderStream::new(object.reader)),
    )
        .into_response();
    if let Some(len) = object.content_length {
        response.headers_mut().insert(CONTENT_LENGTH, len.into());
    }
    Ok(response)
}
