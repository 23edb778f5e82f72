use promptshelf_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `shared_links` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct SharedLink {
    pub slug: String,
    pub prompt_id: DbId,
    pub created_at: Timestamp,
}
