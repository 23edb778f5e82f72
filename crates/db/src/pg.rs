//! Postgres-backed [`RecordStore`].

use async_trait::async_trait;
use promptshelf_core::types::{DbId, SortOrder};

use crate::error::StoreResult;
use crate::models::prompt::{CreatePrompt, Prompt, PromptQuery, UpdatePrompt};
use crate::models::result::{CreateResult, PromptResult, ResultQuery, ResultRow};
use crate::models::shared_link::SharedLink;
use crate::models::tag::{Tag, TagCount};
use crate::models::user::{NewUser, User};
use crate::repositories::{PromptRepo, ResultRepo, SharedLinkRepo, TagRepo, UserRepo};
use crate::store::RecordStore;
use crate::DbPool;

/// Delegates every operation to the per-table repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn decode_all(rows: Vec<ResultRow>) -> StoreResult<Vec<PromptResult>> {
    rows.into_iter().map(PromptResult::try_from).collect()
}

#[async_trait]
impl RecordStore for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    // --- users ---

    async fn create_user(&self, input: &NewUser) -> StoreResult<User> {
        Ok(UserRepo::create(&self.pool, input).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_id(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn update_user_password(&self, id: DbId, password_hash: &str) -> StoreResult<bool> {
        Ok(UserRepo::update_password(&self.pool, id, password_hash).await?)
    }

    // --- prompts ---

    async fn create_prompt(&self, input: &CreatePrompt) -> StoreResult<Prompt> {
        Ok(PromptRepo::create(&self.pool, input).await?)
    }

    async fn find_prompt(&self, id: DbId) -> StoreResult<Option<Prompt>> {
        Ok(PromptRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_prompts(&self, owner: DbId, query: &PromptQuery) -> StoreResult<Vec<Prompt>> {
        Ok(PromptRepo::list_for_owner(&self.pool, owner, query).await?)
    }

    async fn update_prompt(&self, id: DbId, input: &UpdatePrompt) -> StoreResult<Option<Prompt>> {
        Ok(PromptRepo::update(&self.pool, id, input).await?)
    }

    async fn delete_prompt(&self, id: DbId) -> StoreResult<bool> {
        Ok(PromptRepo::delete(&self.pool, id).await?)
    }

    // --- results ---

    async fn create_result(&self, input: &CreateResult) -> StoreResult<PromptResult> {
        ResultRepo::create(&self.pool, input).await?.try_into()
    }

    async fn find_result(&self, id: DbId) -> StoreResult<Option<PromptResult>> {
        ResultRepo::find_by_id(&self.pool, id)
            .await?
            .map(PromptResult::try_from)
            .transpose()
    }

    async fn list_results_for_prompt(
        &self,
        prompt_id: DbId,
        order: SortOrder,
    ) -> StoreResult<Vec<PromptResult>> {
        decode_all(ResultRepo::list_for_prompt(&self.pool, prompt_id, order).await?)
    }

    async fn list_results_for_owner(
        &self,
        owner: DbId,
        query: &ResultQuery,
    ) -> StoreResult<Vec<PromptResult>> {
        decode_all(ResultRepo::list_for_owner(&self.pool, owner, query).await?)
    }

    async fn find_results_for_owner(
        &self,
        owner: DbId,
        ids: &[DbId],
    ) -> StoreResult<Vec<PromptResult>> {
        decode_all(ResultRepo::find_many_for_owner(&self.pool, owner, ids).await?)
    }

    async fn delete_result(&self, id: DbId) -> StoreResult<bool> {
        Ok(ResultRepo::delete(&self.pool, id).await?)
    }

    async fn delete_results(&self, ids: &[DbId]) -> StoreResult<u64> {
        Ok(ResultRepo::delete_many(&self.pool, ids).await?)
    }

    // --- tags ---

    async fn find_tag_by_name(&self, owner: DbId, name: &str) -> StoreResult<Option<Tag>> {
        Ok(TagRepo::find_by_name(&self.pool, owner, name).await?)
    }

    async fn insert_tag(&self, owner: DbId, name: &str) -> StoreResult<Tag> {
        Ok(TagRepo::create(&self.pool, owner, name).await?)
    }

    async fn find_tag(&self, id: DbId) -> StoreResult<Option<Tag>> {
        Ok(TagRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_tags(&self, owner: DbId) -> StoreResult<Vec<Tag>> {
        Ok(TagRepo::list_for_owner(&self.pool, owner).await?)
    }

    async fn delete_tag(&self, id: DbId) -> StoreResult<bool> {
        Ok(TagRepo::delete(&self.pool, id).await?)
    }

    async fn insert_prompt_tag(&self, prompt_id: DbId, tag_id: DbId) -> StoreResult<bool> {
        Ok(TagRepo::link(&self.pool, prompt_id, tag_id).await?)
    }

    async fn delete_prompt_tag(&self, prompt_id: DbId, tag_id: DbId) -> StoreResult<bool> {
        Ok(TagRepo::unlink(&self.pool, prompt_id, tag_id).await?)
    }

    async fn list_tags_for_prompt(&self, prompt_id: DbId) -> StoreResult<Vec<Tag>> {
        Ok(TagRepo::list_for_prompt(&self.pool, prompt_id).await?)
    }

    async fn list_prompts_for_tag(&self, tag_id: DbId) -> StoreResult<Vec<Prompt>> {
        Ok(PromptRepo::list_for_tag(&self.pool, tag_id).await?)
    }

    async fn count_prompt_tags(&self, owner: DbId) -> StoreResult<Vec<TagCount>> {
        Ok(TagRepo::counts_for_owner(&self.pool, owner).await?)
    }

    // --- shared links ---

    async fn insert_shared_link(&self, slug: &str, prompt_id: DbId) -> StoreResult<SharedLink> {
        Ok(SharedLinkRepo::create(&self.pool, slug, prompt_id).await?)
    }

    async fn find_shared_link(&self, slug: &str) -> StoreResult<Option<SharedLink>> {
        Ok(SharedLinkRepo::find_by_slug(&self.pool, slug).await?)
    }

    async fn list_shared_links(&self, prompt_id: DbId) -> StoreResult<Vec<SharedLink>> {
        Ok(SharedLinkRepo::list_for_prompt(&self.pool, prompt_id).await?)
    }

    async fn delete_shared_link(&self, slug: &str) -> StoreResult<bool> {
        Ok(SharedLinkRepo::delete(&self.pool, slug).await?)
    }
}

