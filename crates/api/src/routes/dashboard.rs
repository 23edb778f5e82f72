use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Browser-facing pages (root level), guarded by `RequireSession`.
pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard::dashboard))
}
