//! Handlers for the `/auth` resource (signup, login, identity, password).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use promptshelf_core::error::CoreError;
use promptshelf_core::types::DbId;
use promptshelf_core::validation::{normalize_email, validate_password_strength};
use promptshelf_db::models::user::{NewUser, User};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup` and `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/update-password`.
#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

/// Successful authentication response returned by signup and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
}

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<CredentialsRequest>,
) -> AppResult<impl IntoResponse> {
    let email = normalize_email(&input.email)?;
    validate_password_strength(&input.password)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let user = state
        .store
        .create_user(&NewUser {
            email,
            password_hash,
        })
        .await?;
    tracing::info!(user_id = user.id, "User signed up");

    let response = auth_response(&state, &user)?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// POST /api/auth/login
///
/// Unknown e-mail and wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<CredentialsRequest>,
) -> AppResult<impl IntoResponse> {
    let invalid = || AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into()));

    let email = normalize_email(&input.email).map_err(|_| invalid())?;
    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Login rejected");
        return Err(invalid());
    }

    let response = auth_response(&state, &user)?;
    Ok(Json(DataResponse { data: response }))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let user = state
        .store
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    Ok(Json(DataResponse {
        data: UserInfo {
            id: user.id,
            email: user.email,
        },
    }))
}

/// POST /api/auth/update-password
pub async fn update_password(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdatePasswordRequest>,
) -> AppResult<StatusCode> {
    validate_password_strength(&input.password)?;
    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if !state
        .store
        .update_user_password(auth.user_id, &password_hash)
        .await?
    {
        return Err(AppError::Core(CoreError::Unauthorized(
            "User no longer exists".into(),
        )));
    }
    tracing::info!(user_id = auth.user_id, "Password updated");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let issued = generate_access_token(user.id, &user.email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    Ok(AuthResponse {
        access_token: issued.token,
        expires_in: issued.expires_in,
        user: UserInfo {
            id: user.id,
            email: user.email.clone(),
        },
    })
}
