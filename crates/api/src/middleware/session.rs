//! Session guard for browser-facing routes.
//!
//! A request starts in [`SessionState::Checking`] and ends in exactly one of
//! the two terminal states. Handlers behind [`RequireSession`] only run in
//! the `Authenticated` state; otherwise the response is a bare redirect to
//! the login view so no protected content is ever rendered.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Redirect;

use crate::auth::jwt::JwtConfig;
use crate::middleware::auth::{authenticate, AuthUser};
use crate::state::AppState;

/// Path of the login view.
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Checking,
    Authenticated(AuthUser),
    Redirecting { location: String },
}

impl SessionState {
    /// Advance out of `Checking`. Terminal states are returned unchanged.
    pub fn resolve(self, parts: &Parts, config: &JwtConfig) -> Self {
        match self {
            SessionState::Checking => match authenticate(parts, config) {
                Ok(user) => SessionState::Authenticated(user),
                Err(e) => {
                    tracing::debug!(path = %parts.uri.path(), reason = %e, "No session, redirecting");
                    SessionState::Redirecting {
                        location: login_location(parts),
                    }
                }
            },
            terminal => terminal,
        }
    }
}

/// `/login?next=<original path and query>`.
fn login_location(parts: &Parts) -> String {
    let next = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(next))
}

/// Extractor for pages that need a signed-in user.
#[derive(Debug, Clone)]
pub struct RequireSession(pub AuthUser);

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match SessionState::Checking.resolve(parts, &state.config.jwt) {
            SessionState::Authenticated(user) => Ok(RequireSession(user)),
            SessionState::Redirecting { location } => Err(Redirect::to(&location)),
            SessionState::Checking => Err(Redirect::to(LOGIN_PATH)),
        }
    }
}
