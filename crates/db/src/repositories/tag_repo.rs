//! Repository for the `tags` and `prompt_tags` tables.
//!
//! Tag creation is a plain insert: find-or-create lives in the tag linking
//! service, which relies on `uq_tags_user_name` to settle races.

use promptshelf_core::types::DbId;
use sqlx::PgPool;

use crate::models::tag::{Tag, TagCount};

/// Column list for `tags` queries.
const TAG_COLUMNS: &str = "id, user_id, name, created_at";

/// Same columns qualified with the `t` alias, for joins.
const TAG_COLUMNS_T: &str = "t.id, t.user_id, t.name, t.created_at";

/// Provides CRUD operations for tags and prompt-tag links.
pub struct TagRepo;

impl TagRepo {
    // -----------------------------------------------------------------------
    // Tag CRUD
    // -----------------------------------------------------------------------

    /// Insert a tag. A duplicate `(user_id, name)` violates `uq_tags_user_name`.
    pub async fn create(pool: &PgPool, user_id: DbId, name: &str) -> Result<Tag, sqlx::Error> {
        let query = format!(
            "INSERT INTO tags (user_id, name) VALUES ($1, $2) RETURNING {TAG_COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(user_id)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = $1");
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Exact, case-sensitive lookup within one owner's tags.
    pub async fn find_by_name(
        pool: &PgPool,
        user_id: DbId,
        name: &str,
    ) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE user_id = $1 AND name = $2");
        sqlx::query_as::<_, Tag>(&query)
            .bind(user_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_owner(pool: &PgPool, user_id: DbId) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE user_id = $1 ORDER BY name, id");
        sqlx::query_as::<_, Tag>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a tag. Its prompt links cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Prompt-tag links
    // -----------------------------------------------------------------------

    /// Link a tag to a prompt. Returns `true` if a new row was inserted,
    /// `false` if the pair was already linked.
    pub async fn link(pool: &PgPool, prompt_id: DbId, tag_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO prompt_tags (prompt_id, tag_id) VALUES ($1, $2) \
             ON CONFLICT (prompt_id, tag_id) DO NOTHING",
        )
        .bind(prompt_id)
        .bind(tag_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a link. Returns `true` if a row was deleted.
    pub async fn unlink(pool: &PgPool, prompt_id: DbId, tag_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM prompt_tags WHERE prompt_id = $1 AND tag_id = $2")
            .bind(prompt_id)
            .bind(tag_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_for_prompt(pool: &PgPool, prompt_id: DbId) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!(
            "SELECT {TAG_COLUMNS_T} FROM tags t \
             JOIN prompt_tags pt ON pt.tag_id = t.id \
             WHERE pt.prompt_id = $1 \
             ORDER BY t.name, t.id"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(prompt_id)
            .fetch_all(pool)
            .await
    }

    /// Link counts for the owner's tags. Tags with no links are omitted.
    pub async fn counts_for_owner(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<TagCount>, sqlx::Error> {
        sqlx::query_as::<_, TagCount>(
            "SELECT t.id AS tag_id, t.name, COUNT(*) AS count \
             FROM tags t \
             JOIN prompt_tags pt ON pt.tag_id = t.id \
             WHERE t.user_id = $1 \
             GROUP BY t.id, t.name \
             ORDER BY t.id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
