//! Repository for the `results` table.

use promptshelf_core::types::{DbId, SortOrder};
use sqlx::PgPool;

use super::contains_pattern;
use crate::models::result::{CreateResult, ResultQuery, ResultRow};

/// Column list for `results` queries.
const COLUMNS: &str = "id, prompt_id, type, content, file_path, size, created_at";

/// Same columns qualified with the `r` alias, for joins.
const COLUMNS_R: &str =
    "r.id, r.prompt_id, r.type, r.content, r.file_path, r.size, r.created_at";

/// Provides CRUD operations for results. Rows come back undecoded; the
/// store converts them into `PromptResult`.
pub struct ResultRepo;

impl ResultRepo {
    pub async fn create(pool: &PgPool, input: &CreateResult) -> Result<ResultRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO results (prompt_id, type, content, file_path, size) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ResultRow>(&query)
            .bind(input.prompt_id)
            .bind(input.kind.name())
            .bind(&input.content)
            .bind(input.file_path.as_deref())
            .bind(input.size)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ResultRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM results WHERE id = $1");
        sqlx::query_as::<_, ResultRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_prompt(
        pool: &PgPool,
        prompt_id: DbId,
        order: SortOrder,
    ) -> Result<Vec<ResultRow>, sqlx::Error> {
        let dir = order.as_sql();
        let query = format!(
            "SELECT {COLUMNS} FROM results WHERE prompt_id = $1 \
             ORDER BY created_at {dir}, id {dir}"
        );
        sqlx::query_as::<_, ResultRow>(&query)
            .bind(prompt_id)
            .fetch_all(pool)
            .await
    }

    /// Upload history: every result under the owner's prompts, filtered.
    pub async fn list_for_owner(
        pool: &PgPool,
        user_id: DbId,
        params: &ResultQuery,
    ) -> Result<Vec<ResultRow>, sqlx::Error> {
        let dir = params.order.as_sql();
        let query = format!(
            "SELECT {COLUMNS_R} FROM results r \
             JOIN prompts p ON p.id = r.prompt_id \
             WHERE p.user_id = $1 \
               AND ($2::TEXT IS NULL OR r.file_path ILIKE $2) \
               AND ($3::TIMESTAMPTZ IS NULL OR r.created_at >= $3) \
               AND ($4::TIMESTAMPTZ IS NULL OR r.created_at <= $4) \
               AND ($5::TEXT IS NULL OR r.type = $5) \
             ORDER BY r.created_at {dir}, r.id {dir}"
        );
        let pattern = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);
        sqlx::query_as::<_, ResultRow>(&query)
            .bind(user_id)
            .bind(pattern)
            .bind(params.from)
            .bind(params.to)
            .bind(params.kind.map(|k| k.name()))
            .fetch_all(pool)
            .await
    }

    /// The subset of `ids` whose prompt belongs to `user_id`.
    pub async fn find_many_for_owner(
        pool: &PgPool,
        user_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<ResultRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS_R} FROM results r \
             JOIN prompts p ON p.id = r.prompt_id \
             WHERE p.user_id = $1 AND r.id = ANY($2) \
             ORDER BY r.id"
        );
        sqlx::query_as::<_, ResultRow>(&query)
            .bind(user_id)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM results WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every result in `ids`. Returns the number of rows removed.
    pub async fn delete_many(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM results WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
