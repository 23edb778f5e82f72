//! Slug-based public sharing.
//!
//! A slug is the only credential for a shared view. Resolution never
//! distinguishes "no such slug" from "prompt gone".

use std::time::Duration;

use promptshelf_core::error::CoreError;
use promptshelf_core::sharing::{generate_slug, is_well_formed_slug};
use promptshelf_core::storage::ResultKind;
use promptshelf_core::types::{DbId, SortOrder, Timestamp};
use promptshelf_db::models::shared_link::SharedLink;
use promptshelf_db::{RecordStore, StoreError};
use promptshelf_storage::StorageGateway;
use serde::Serialize;

use crate::config::SharingConfig;
use crate::error::{AppError, AppResult};
use crate::services::prompts::load_owned_prompt;
use crate::services::results::sign_results;

/// Prompt fields exposed to anonymous viewers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedPrompt {
    pub id: DbId,
    pub title: Option<String>,
    pub content: String,
    pub created_at: Timestamp,
}

/// One result in a shared view. Text results carry their content, images
/// their signed URL (or `None` when the object is unavailable).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedResult {
    pub id: DbId,
    #[serde(rename = "type")]
    pub kind: ResultKind,
    pub content: Option<String>,
    pub signed_url: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedView {
    pub prompt: SharedPrompt,
    pub results: Vec<SharedResult>,
}

/// Create a shared link for a prompt the caller owns.
pub async fn create_link(
    store: &dyn RecordStore,
    owner: DbId,
    prompt_id: DbId,
    config: &SharingConfig,
) -> AppResult<SharedLink> {
    load_owned_prompt(store, owner, prompt_id).await?;
    let link = create_link_with(store, prompt_id, config.max_slug_attempts, || {
        generate_slug(config.slug_length)
    })
    .await?;
    tracing::info!(prompt_id, user_id = owner, "Shared link created");
    Ok(link)
}

/// Insert a link using slugs from `next_slug`, drawing a fresh one after
/// each collision, at most `attempts` times.
pub async fn create_link_with<F>(
    store: &dyn RecordStore,
    prompt_id: DbId,
    attempts: u32,
    mut next_slug: F,
) -> AppResult<SharedLink>
where
    F: FnMut() -> String + Send,
{
    for attempt in 1..=attempts {
        let slug = next_slug();
        match store.insert_shared_link(&slug, prompt_id).await {
            Ok(link) => return Ok(link),
            Err(StoreError::UniqueViolation(_)) => {
                tracing::warn!(prompt_id, attempt, "Share slug collision, regenerating");
            }
            Err(StoreError::ForeignKeyViolation(_)) => {
                return Err(CoreError::not_found("Prompt", prompt_id).into());
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(AppError::SlugGenerationFailed { attempts })
}

/// Revoke a link on one of the caller's prompts.
pub async fn revoke_link(store: &dyn RecordStore, owner: DbId, slug: &str) -> AppResult<()> {
    let link = store
        .find_shared_link(slug)
        .await?
        .ok_or_else(|| CoreError::not_found("SharedLink", slug))?;
    load_owned_prompt(store, owner, link.prompt_id).await?;
    store.delete_shared_link(slug).await?;
    tracing::info!(prompt_id = link.prompt_id, user_id = owner, "Shared link revoked");
    Ok(())
}

/// Resolve a slug into its read-only view.
///
/// Image results are signed concurrently with `ttl`; a result whose object
/// cannot be signed is returned with `signed_url: None` rather than failing
/// the whole view.
pub async fn resolve(
    store: &dyn RecordStore,
    storage: &dyn StorageGateway,
    slug: &str,
    ttl: Duration,
) -> AppResult<SharedView> {
    let not_found = || CoreError::not_found("SharedLink", slug);

    if !is_well_formed_slug(slug) {
        return Err(not_found().into());
    }
    let link = store.find_shared_link(slug).await?.ok_or_else(not_found)?;
    let prompt = store
        .find_prompt(link.prompt_id)
        .await?
        .ok_or_else(not_found)?;

    let results = store
        .list_results_for_prompt(prompt.id, SortOrder::Asc)
        .await?;
    let signed = sign_results(storage, results, ttl).await;

    let results = signed
        .into_iter()
        .map(|s| {
            let content = (s.result.kind == ResultKind::Text).then_some(s.result.content);
            SharedResult {
                id: s.result.id,
                kind: s.result.kind,
                content,
                signed_url: s.signed_url,
                created_at: s.result.created_at,
            }
        })
        .collect();

    tracing::debug!(prompt_id = prompt.id, "Shared link resolved");
    Ok(SharedView {
        prompt: SharedPrompt {
            id: prompt.id,
            title: prompt.title,
            content: prompt.content,
            created_at: prompt.created_at,
        },
        results,
    })
}
