//! The record-store boundary.
//!
//! Handlers and services talk to persistence only through [`RecordStore`].
//! Implementations must enforce the same constraints: unique e-mails, unique
//! `(owner, tag name)`, unique slugs, a single link row per `(prompt, tag)`,
//! foreign keys on every reference, and cascading prompt/tag deletes.
//! Ownership checks happen in the callers, which always pass the caller's
//! identity explicitly.

use async_trait::async_trait;
use promptshelf_core::types::{DbId, SortOrder};

use crate::error::StoreResult;
use crate::models::prompt::{CreatePrompt, Prompt, PromptQuery, UpdatePrompt};
use crate::models::result::{CreateResult, PromptResult, ResultQuery};
use crate::models::shared_link::SharedLink;
use crate::models::tag::{Tag, TagCount};
use crate::models::user::{NewUser, User};

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn health_check(&self) -> StoreResult<()>;

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    async fn create_user(&self, input: &NewUser) -> StoreResult<User>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_id(&self, id: DbId) -> StoreResult<Option<User>>;
    async fn update_user_password(&self, id: DbId, password_hash: &str) -> StoreResult<bool>;

    // -----------------------------------------------------------------------
    // Prompts
    // -----------------------------------------------------------------------

    async fn create_prompt(&self, input: &CreatePrompt) -> StoreResult<Prompt>;
    async fn find_prompt(&self, id: DbId) -> StoreResult<Option<Prompt>>;
    async fn list_prompts(&self, owner: DbId, query: &PromptQuery) -> StoreResult<Vec<Prompt>>;
    async fn update_prompt(&self, id: DbId, input: &UpdatePrompt) -> StoreResult<Option<Prompt>>;
    /// Deletes the prompt with its results, tag links and shared links.
    async fn delete_prompt(&self, id: DbId) -> StoreResult<bool>;

    // -----------------------------------------------------------------------
    // Results
    // -----------------------------------------------------------------------

    async fn create_result(&self, input: &CreateResult) -> StoreResult<PromptResult>;
    async fn find_result(&self, id: DbId) -> StoreResult<Option<PromptResult>>;
    async fn list_results_for_prompt(
        &self,
        prompt_id: DbId,
        order: SortOrder,
    ) -> StoreResult<Vec<PromptResult>>;
    async fn list_results_for_owner(
        &self,
        owner: DbId,
        query: &ResultQuery,
    ) -> StoreResult<Vec<PromptResult>>;
    /// The members of `ids` that belong to prompts owned by `owner`.
    async fn find_results_for_owner(
        &self,
        owner: DbId,
        ids: &[DbId],
    ) -> StoreResult<Vec<PromptResult>>;
    async fn delete_result(&self, id: DbId) -> StoreResult<bool>;
    async fn delete_results(&self, ids: &[DbId]) -> StoreResult<u64>;

    // -----------------------------------------------------------------------
    // Tags
    // -----------------------------------------------------------------------

    async fn find_tag_by_name(&self, owner: DbId, name: &str) -> StoreResult<Option<Tag>>;
    /// Fails with `UniqueViolation` if the owner already has a tag named `name`.
    async fn insert_tag(&self, owner: DbId, name: &str) -> StoreResult<Tag>;
    async fn find_tag(&self, id: DbId) -> StoreResult<Option<Tag>>;
    async fn list_tags(&self, owner: DbId) -> StoreResult<Vec<Tag>>;
    async fn delete_tag(&self, id: DbId) -> StoreResult<bool>;
    /// `true` if a new link row was written, `false` if it already existed.
    async fn insert_prompt_tag(&self, prompt_id: DbId, tag_id: DbId) -> StoreResult<bool>;
    /// `true` if a link row was removed.
    async fn delete_prompt_tag(&self, prompt_id: DbId, tag_id: DbId) -> StoreResult<bool>;
    async fn list_tags_for_prompt(&self, prompt_id: DbId) -> StoreResult<Vec<Tag>>;
    async fn list_prompts_for_tag(&self, tag_id: DbId) -> StoreResult<Vec<Prompt>>;
    /// Link counts for the owner's tags; unlinked tags are omitted.
    async fn count_prompt_tags(&self, owner: DbId) -> StoreResult<Vec<TagCount>>;

    // -----------------------------------------------------------------------
    // Shared links
    // -----------------------------------------------------------------------

    /// Fails with `UniqueViolation` on slug collision and
    /// `ForeignKeyViolation` if the prompt does not exist.
    async fn insert_shared_link(&self, slug: &str, prompt_id: DbId) -> StoreResult<SharedLink>;
    async fn find_shared_link(&self, slug: &str) -> StoreResult<Option<SharedLink>>;
    async fn list_shared_links(&self, prompt_id: DbId) -> StoreResult<Vec<SharedLink>>;
    async fn delete_shared_link(&self, slug: &str) -> StoreResult<bool>;
}
