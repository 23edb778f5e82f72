//! Result artifacts attached to prompts.
//!
//! The `type` column is stored as text. [`ResultRow`] is the raw row and
//! [`PromptResult`] the decoded form handed to callers; rows with an unknown
//! type fail with [`StoreError::Decode`] instead of leaking through.

use promptshelf_core::storage::ResultKind;
use promptshelf_core::types::{DbId, SortOrder, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::error::StoreError;

/// A raw row from the `results` table.
#[derive(Debug, Clone, FromRow)]
pub struct ResultRow {
    pub id: DbId,
    pub prompt_id: DbId,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub content: String,
    pub file_path: Option<String>,
    pub size: Option<i64>,
    pub created_at: Timestamp,
}

/// A decoded result.
///
/// For `text` results `content` is the text itself. For `image` results it
/// is the public URL of the stored object and `file_path` is its key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptResult {
    pub id: DbId,
    pub prompt_id: DbId,
    #[serde(rename = "type")]
    pub kind: ResultKind,
    pub content: String,
    pub file_path: Option<String>,
    pub size: Option<i64>,
    pub created_at: Timestamp,
}

impl TryFrom<ResultRow> for PromptResult {
    type Error = StoreError;

    fn try_from(row: ResultRow) -> Result<Self, Self::Error> {
        let kind = ResultKind::from_name(&row.kind)
            .map_err(|e| StoreError::Decode(format!("results.id={}: {e}", row.id)))?;
        Ok(Self {
            id: row.id,
            prompt_id: row.prompt_id,
            kind,
            content: row.content,
            file_path: row.file_path,
            size: row.size,
            created_at: row.created_at,
        })
    }
}

/// Insert payload for a result.
#[derive(Debug, Clone)]
pub struct CreateResult {
    pub prompt_id: DbId,
    pub kind: ResultKind,
    pub content: String,
    pub file_path: Option<String>,
    pub size: Option<i64>,
}

/// Filters for the owner's upload history.
#[derive(Debug, Clone, Default)]
pub struct ResultQuery {
    /// Case-insensitive substring over `file_path`.
    pub search: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub from: Option<Timestamp>,
    /// Inclusive upper bound on `created_at`.
    pub to: Option<Timestamp>,
    pub kind: Option<ResultKind>,
    pub order: SortOrder,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn row(kind: &str) -> ResultRow {
        ResultRow {
            id: 1,
            prompt_id: 2,
            kind: kind.to_string(),
            content: "x".to_string(),
            file_path: None,
            size: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn known_type_decodes() {
        let result = PromptResult::try_from(row("image")).unwrap();
        assert_eq!(result.kind, ResultKind::Image);
    }

    #[test]
    fn unknown_type_is_a_decode_error() {
        assert_matches!(PromptResult::try_from(row("video")), Err(StoreError::Decode(_)));
    }
}
