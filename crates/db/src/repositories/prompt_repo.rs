//! Repository for the `prompts` table.

use promptshelf_core::types::DbId;
use sqlx::PgPool;

use super::contains_pattern;
use crate::models::prompt::{CreatePrompt, Prompt, PromptQuery, UpdatePrompt};

/// Column list for `prompts` queries.
const COLUMNS: &str = "id, user_id, title, content, created_at, updated_at";

/// Same columns qualified with the `p` alias, for joins.
const COLUMNS_P: &str = "p.id, p.user_id, p.title, p.content, p.created_at, p.updated_at";

/// Provides CRUD operations for prompts.
pub struct PromptRepo;

impl PromptRepo {
    pub async fn create(pool: &PgPool, input: &CreatePrompt) -> Result<Prompt, sqlx::Error> {
        let query = format!(
            "INSERT INTO prompts (user_id, title, content) VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prompt>(&query)
            .bind(input.user_id)
            .bind(input.title.as_deref())
            .bind(&input.content)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Prompt>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prompts WHERE id = $1");
        sqlx::query_as::<_, Prompt>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an owner's prompts, optionally restricted to one tag and a
    /// title/content substring.
    pub async fn list_for_owner(
        pool: &PgPool,
        user_id: DbId,
        params: &PromptQuery,
    ) -> Result<Vec<Prompt>, sqlx::Error> {
        let dir = params.order.as_sql();
        let query = format!(
            "SELECT {COLUMNS_P} FROM prompts p \
             WHERE p.user_id = $1 \
               AND ($2::BIGINT IS NULL OR EXISTS ( \
                     SELECT 1 FROM prompt_tags pt \
                     WHERE pt.prompt_id = p.id AND pt.tag_id = $2)) \
               AND ($3::TEXT IS NULL OR p.content ILIKE $3 OR p.title ILIKE $3) \
             ORDER BY p.created_at {dir}, p.id {dir}"
        );
        let pattern = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);
        sqlx::query_as::<_, Prompt>(&query)
            .bind(user_id)
            .bind(params.tag_id)
            .bind(pattern)
            .fetch_all(pool)
            .await
    }

    /// List prompts carrying `tag_id`, newest first.
    pub async fn list_for_tag(pool: &PgPool, tag_id: DbId) -> Result<Vec<Prompt>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS_P} FROM prompts p \
             JOIN prompt_tags pt ON pt.prompt_id = p.id \
             WHERE pt.tag_id = $1 \
             ORDER BY p.created_at DESC, p.id DESC"
        );
        sqlx::query_as::<_, Prompt>(&query)
            .bind(tag_id)
            .fetch_all(pool)
            .await
    }

    /// Replace title and content. Returns `None` if the prompt is gone.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePrompt,
    ) -> Result<Option<Prompt>, sqlx::Error> {
        let query = format!(
            "UPDATE prompts SET title = $2, content = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prompt>(&query)
            .bind(id)
            .bind(input.title.as_deref())
            .bind(&input.content)
            .fetch_optional(pool)
            .await
    }

    /// Delete a prompt. Results, tag links and shared links cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM prompts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
