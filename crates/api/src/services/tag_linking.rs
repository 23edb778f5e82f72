//! Find-or-create tags and link them to prompts.
//!
//! The `(user_id, name)` uniqueness constraint in the store is what keeps a
//! tag single. The lookup in [`ensure_tag`] only saves a round trip; when two
//! callers race past it, the loser's insert fails with a unique violation
//! and it re-reads the winner's row.

use promptshelf_core::error::CoreError;
use promptshelf_core::tag_cloud::font_size;
use promptshelf_core::types::DbId;
use promptshelf_core::validation::normalize_tag_name;
use promptshelf_db::models::tag::{Tag, TagCount};
use promptshelf_db::{RecordStore, StoreError};
use serde::Serialize;

use crate::error::AppResult;
use crate::services::prompts::load_owned_prompt;

/// One entry of the tag cloud.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagCloudEntry {
    pub tag_id: DbId,
    pub name: String,
    pub count: i64,
    /// Display size in pixels.
    pub font_size: u32,
}

pub async fn ensure_tag(store: &dyn RecordStore, owner: DbId, name: &str) -> AppResult<Tag> {
    let name = normalize_tag_name(name)?;

    if let Some(tag) = store.find_tag_by_name(owner, &name).await? {
        return Ok(tag);
    }
    match store.insert_tag(owner, &name).await {
        Ok(tag) => {
            tracing::info!(tag_id = tag.id, user_id = owner, "Tag created");
            Ok(tag)
        }
        Err(StoreError::UniqueViolation(_)) => {
            tracing::debug!(user_id = owner, tag = %name, "Lost tag creation race, reusing");
            let tag = store
                .find_tag_by_name(owner, &name)
                .await?
                .ok_or_else(|| CoreError::Internal(format!("tag '{name}' vanished after conflict")))?;
            Ok(tag)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn load_owned_tag(store: &dyn RecordStore, owner: DbId, tag_id: DbId) -> AppResult<Tag> {
    let tag = store
        .find_tag(tag_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Tag", tag_id))?;
    if tag.user_id != owner {
        return Err(CoreError::Forbidden("Tag belongs to another user".into()).into());
    }
    Ok(tag)
}

/// Link a prompt and a tag, both owned by `owner`. Linking an existing pair
/// is a no-op; returns whether a new link was written.
pub async fn link(
    store: &dyn RecordStore,
    owner: DbId,
    prompt_id: DbId,
    tag_id: DbId,
) -> AppResult<bool> {
    load_owned_prompt(store, owner, prompt_id).await?;
    load_owned_tag(store, owner, tag_id).await?;
    let created = store.insert_prompt_tag(prompt_id, tag_id).await?;
    tracing::info!(prompt_id, tag_id, created, "Tag linked");
    Ok(created)
}

/// Remove a link if present; returns whether one was removed.
pub async fn unlink(
    store: &dyn RecordStore,
    owner: DbId,
    prompt_id: DbId,
    tag_id: DbId,
) -> AppResult<bool> {
    load_owned_prompt(store, owner, prompt_id).await?;
    load_owned_tag(store, owner, tag_id).await?;
    let removed = store.delete_prompt_tag(prompt_id, tag_id).await?;
    tracing::info!(prompt_id, tag_id, removed, "Tag unlinked");
    Ok(removed)
}

/// Number of linked prompts per tag of `owner`. Tags without links are
/// absent.
pub async fn counts_by_tag(store: &dyn RecordStore, owner: DbId) -> AppResult<Vec<TagCount>> {
    Ok(store.count_prompt_tags(owner).await?)
}

/// Weight counts for display, most used first, ties by name.
pub fn tag_cloud(counts: Vec<TagCount>) -> Vec<TagCloudEntry> {
    let max = counts.iter().map(|c| c.count).max().unwrap_or(0);
    let mut entries: Vec<TagCloudEntry> = counts
        .into_iter()
        .map(|c| TagCloudEntry {
            font_size: font_size(c.count, max),
            tag_id: c.tag_id,
            name: c.name,
            count: c.count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    entries
}
