//! Session extractors.
//!
//! - [`auth::AuthUser`] -- JSON API guard, rejects with 401.
//! - [`session::RequireSession`] -- browser guard, redirects to the login view.

pub mod auth;
pub mod session;
