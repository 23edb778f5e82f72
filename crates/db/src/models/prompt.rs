//! Prompt model and DTOs.

use promptshelf_core::types::{DbId, SortOrder, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `prompts` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Prompt {
    pub id: DbId,
    pub user_id: DbId,
    pub title: Option<String>,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Insert payload for a prompt. Content must already be validated.
#[derive(Debug, Clone)]
pub struct CreatePrompt {
    pub user_id: DbId,
    pub title: Option<String>,
    pub content: String,
}

/// Full replacement of the editable prompt fields.
#[derive(Debug, Clone)]
pub struct UpdatePrompt {
    pub title: Option<String>,
    pub content: String,
}

/// Filters for the owner's prompt listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptQuery {
    /// Only prompts linked to this tag.
    pub tag_id: Option<DbId>,
    /// Case-insensitive substring over title and content.
    #[serde(rename = "q")]
    pub search: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
}
