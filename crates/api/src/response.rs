//! Shared response envelope types for API handlers.
//!
//! Successful JSON responses use a `{ "data": ... }` envelope. The two
//! collaborator endpoints (`POST /api/prompts`, `POST /api/shared-links`)
//! keep their bare payloads.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
