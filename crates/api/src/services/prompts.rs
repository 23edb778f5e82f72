//! Prompt lifecycle with ownership checks.

use promptshelf_core::error::CoreError;
use promptshelf_core::types::{DbId, SortOrder};
use promptshelf_core::validation::{normalize_prompt_title, validate_prompt_content};
use promptshelf_db::models::prompt::{CreatePrompt, Prompt, UpdatePrompt};
use promptshelf_db::models::result::PromptResult;
use promptshelf_db::models::shared_link::SharedLink;
use promptshelf_db::models::tag::Tag;
use promptshelf_db::RecordStore;
use promptshelf_storage::StorageGateway;
use serde::Serialize;

use crate::error::AppResult;
use crate::services::results::image_key;

/// A prompt with everything attached to it.
#[derive(Debug, Serialize)]
pub struct PromptDetail {
    #[serde(flatten)]
    pub prompt: Prompt,
    /// Oldest first, so the list reads as a comparison timeline.
    pub results: Vec<PromptResult>,
    pub tags: Vec<Tag>,
    pub shared_links: Vec<SharedLink>,
}

/// Load a prompt the caller owns. Another owner's prompt is
/// `PermissionDenied`, never returned.
pub async fn load_owned_prompt(
    store: &dyn RecordStore,
    owner: DbId,
    prompt_id: DbId,
) -> AppResult<Prompt> {
    let prompt = store
        .find_prompt(prompt_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Prompt", prompt_id))?;
    if prompt.user_id != owner {
        tracing::warn!(prompt_id, user_id = owner, "Prompt ownership mismatch");
        return Err(CoreError::Forbidden("Prompt belongs to another user".into()).into());
    }
    Ok(prompt)
}

pub async fn create_prompt(
    store: &dyn RecordStore,
    owner: DbId,
    title: Option<&str>,
    content: &str,
) -> AppResult<Prompt> {
    let content = validate_prompt_content(content)?;
    let title = normalize_prompt_title(title)?;
    let prompt = store
        .create_prompt(&CreatePrompt {
            user_id: owner,
            title,
            content: content.to_string(),
        })
        .await?;
    tracing::info!(prompt_id = prompt.id, user_id = owner, "Prompt created");
    Ok(prompt)
}

pub async fn update_prompt(
    store: &dyn RecordStore,
    owner: DbId,
    prompt_id: DbId,
    title: Option<&str>,
    content: &str,
) -> AppResult<Prompt> {
    let content = validate_prompt_content(content)?;
    let title = normalize_prompt_title(title)?;
    load_owned_prompt(store, owner, prompt_id).await?;

    let prompt = store
        .update_prompt(
            prompt_id,
            &UpdatePrompt {
                title,
                content: content.to_string(),
            },
        )
        .await?
        .ok_or_else(|| CoreError::not_found("Prompt", prompt_id))?;
    tracing::info!(prompt_id, user_id = owner, "Prompt updated");
    Ok(prompt)
}

pub async fn prompt_detail(
    store: &dyn RecordStore,
    owner: DbId,
    prompt_id: DbId,
) -> AppResult<PromptDetail> {
    let prompt = load_owned_prompt(store, owner, prompt_id).await?;
    let results = store
        .list_results_for_prompt(prompt_id, SortOrder::Asc)
        .await?;
    let tags = store.list_tags_for_prompt(prompt_id).await?;
    let shared_links = store.list_shared_links(prompt_id).await?;
    Ok(PromptDetail {
        prompt,
        results,
        tags,
        shared_links,
    })
}

/// Delete a prompt and everything attached to it.
///
/// Stored images go first in a single batch. If that fails the prompt row
/// stays and the storage error is returned; the database cascade removes
/// results, tag links and shared links.
pub async fn delete_prompt(
    store: &dyn RecordStore,
    storage: &dyn StorageGateway,
    owner: DbId,
    prompt_id: DbId,
) -> AppResult<()> {
    load_owned_prompt(store, owner, prompt_id).await?;

    let results = store
        .list_results_for_prompt(prompt_id, SortOrder::Asc)
        .await?;
    let keys: Vec<String> = results
        .iter()
        .filter_map(|r| image_key(r, storage.bucket()))
        .collect();
    if !keys.is_empty() {
        storage.remove(&keys).await?;
    }

    if !store.delete_prompt(prompt_id).await? {
        return Err(CoreError::not_found("Prompt", prompt_id).into());
    }
    tracing::info!(prompt_id, user_id = owner, objects = keys.len(), "Prompt deleted");
    Ok(())
}
