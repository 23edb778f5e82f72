//! Repository for the `shared_links` table.

use promptshelf_core::types::DbId;
use sqlx::PgPool;

use crate::models::shared_link::SharedLink;

/// Column list for `shared_links` queries.
const COLUMNS: &str = "slug, prompt_id, created_at";

/// Provides insert, lookup and revocation of share slugs.
pub struct SharedLinkRepo;

impl SharedLinkRepo {
    /// Insert a slug. A collision violates `shared_links_pkey`; a missing
    /// prompt violates the `prompt_id` foreign key.
    pub async fn create(
        pool: &PgPool,
        slug: &str,
        prompt_id: DbId,
    ) -> Result<SharedLink, sqlx::Error> {
        let query = format!(
            "INSERT INTO shared_links (slug, prompt_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SharedLink>(&query)
            .bind(slug)
            .bind(prompt_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<SharedLink>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM shared_links WHERE slug = $1");
        sqlx::query_as::<_, SharedLink>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_prompt(
        pool: &PgPool,
        prompt_id: DbId,
    ) -> Result<Vec<SharedLink>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shared_links WHERE prompt_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, SharedLink>(&query)
            .bind(prompt_id)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM shared_links WHERE slug = $1")
            .bind(slug)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
