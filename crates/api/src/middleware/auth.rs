//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use promptshelf_core::error::CoreError;
use promptshelf_core::types::DbId;

use crate::auth::jwt::{validate_token, JwtConfig};
use crate::error::AppError;
use crate::state::AppState;

/// Cookie consulted when no `Authorization` header is present.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authenticated user extracted from a JWT.
///
/// Use this as an extractor parameter in any handler that requires a session.
/// The identity is then passed explicitly into every store call:
///
/// ```ignore
/// async fn my_handler(auth: AuthUser, State(state): State<AppState>) -> AppResult<Json<()>> {
///     let tags = state.store.list_tags(auth.user_id).await?;
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    pub email: String,
}

/// Resolve the caller's identity from the `Authorization: Bearer` header,
/// falling back to the `access_token` cookie.
pub fn authenticate(parts: &Parts, config: &JwtConfig) -> Result<AuthUser, CoreError> {
    let token = match parts.headers.get(AUTHORIZATION) {
        Some(value) => value
            .to_str()
            .map_err(|_| CoreError::Unauthorized("Malformed Authorization header".into()))?
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                CoreError::Unauthorized(
                    "Invalid Authorization format. Expected: Bearer <token>".into(),
                )
            })?
            .to_owned(),
        None => CookieJar::from_headers(&parts.headers)
            .get(ACCESS_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_owned())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| CoreError::Unauthorized("Missing session".into()))?,
    };

    let claims = validate_token(&token, config)
        .map_err(|_| CoreError::Unauthorized("Invalid or expired token".into()))?;

    Ok(AuthUser {
        user_id: claims.sub,
        email: claims.email,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(authenticate(parts, &state.config.jwt)?)
    }
}
