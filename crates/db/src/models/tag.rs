//! Tag and usage-count models.

use promptshelf_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `tags` table. Names are unique per owner.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Tag {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}

/// Number of prompts linked to one tag.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct TagCount {
    pub tag_id: DbId,
    pub name: String,
    pub count: i64,
}
