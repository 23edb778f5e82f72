//! Request handlers.
//!
//! Each submodule holds the async handler functions for one resource.
//! Handlers extract the caller's identity, delegate to [`crate::services`]
//! or the record store, and map errors via [`crate::error::AppError`].

pub mod auth;
pub mod dashboard;
pub mod prompts;
pub mod results;
pub mod sharing;
pub mod storage;
pub mod tags;

use axum::http::header::ALLOW;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Fallback for POST-only collaborator endpoints: 405 with `Allow: POST`.
pub async fn post_only() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(ALLOW, "POST")],
        Json(json!({ "error": "Method not allowed" })),
    )
}
