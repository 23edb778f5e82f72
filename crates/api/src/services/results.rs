//! Result artifacts: text results, image uploads, deletes and signed
//! listings.

use std::collections::BTreeSet;
use std::time::Duration;

use futures::future::join_all;
use promptshelf_core::error::CoreError;
use promptshelf_core::export::{render_csv, ExportRow};
use promptshelf_core::storage::{flat_key, key_from_public_url, scoped_key, ResultKind};
use promptshelf_core::types::DbId;
use promptshelf_core::validation::validate_text_result;
use promptshelf_db::models::result::{CreateResult, PromptResult};
use promptshelf_db::RecordStore;
use promptshelf_storage::StorageGateway;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::services::prompts::load_owned_prompt;

/// An uploaded file as read from a multipart field.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Per-file outcome of a batch upload.
#[derive(Debug, Serialize)]
pub struct UploadOutcome {
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PromptResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A result with a time-limited read URL. `signed_url` is `None` for text
/// results and for images whose object could not be signed.
#[derive(Debug, Serialize)]
pub struct SignedResult {
    #[serde(flatten)]
    pub result: PromptResult,
    pub signed_url: Option<String>,
}

/// Storage key behind an image result: the recorded `file_path`, or failing
/// that the key embedded in its public URL.
pub fn image_key(result: &PromptResult, bucket: &str) -> Option<String> {
    if result.kind != ResultKind::Image {
        return None;
    }
    result
        .file_path
        .clone()
        .filter(|k| !k.is_empty())
        .or_else(|| key_from_public_url(&result.content, bucket))
}

pub async fn create_text_result(
    store: &dyn RecordStore,
    owner: DbId,
    prompt_id: DbId,
    content: &str,
) -> AppResult<PromptResult> {
    let content = validate_text_result(content)?;
    load_owned_prompt(store, owner, prompt_id).await?;

    let result = store
        .create_result(&CreateResult {
            prompt_id,
            kind: ResultKind::Text,
            content: content.to_string(),
            file_path: None,
            size: None,
        })
        .await?;
    tracing::info!(result_id = result.id, prompt_id, "Text result created");
    Ok(result)
}

/// Content type of an image upload, sniffed from its bytes.
fn image_content_type(file: &UploadedFile) -> Result<&'static str, CoreError> {
    if file.bytes.is_empty() {
        return Err(CoreError::Validation(format!("'{}' is empty", file.file_name)));
    }
    image::guess_format(&file.bytes)
        .map(|format| format.to_mime_type())
        .map_err(|_| {
            CoreError::Validation(format!("'{}' is not a supported image", file.file_name))
        })
}

/// Store one image under `key` and record it. If the row cannot be written
/// the object is removed again so it does not linger unreferenced.
async fn store_image(
    store: &dyn RecordStore,
    storage: &dyn StorageGateway,
    prompt_id: DbId,
    key: &str,
    file: UploadedFile,
) -> AppResult<PromptResult> {
    let content_type = image_content_type(&file)?;
    let stored = storage.put(key, file.bytes, content_type).await?;

    let input = CreateResult {
        prompt_id,
        kind: ResultKind::Image,
        content: stored.public_url.clone(),
        file_path: Some(stored.key.clone()),
        size: Some(i64::try_from(stored.size).unwrap_or(i64::MAX)),
    };
    match store.create_result(&input).await {
        Ok(result) => {
            tracing::info!(result_id = result.id, prompt_id, key, size = stored.size, "Image stored");
            Ok(result)
        }
        Err(e) => {
            if let Err(cleanup) = storage.remove(&[stored.key]).await {
                tracing::warn!(key, error = %cleanup, "Could not remove object after failed insert");
            }
            Err(e.into())
        }
    }
}

/// Upload one image under a prompt-scoped key.
pub async fn upload_image(
    store: &dyn RecordStore,
    storage: &dyn StorageGateway,
    owner: DbId,
    prompt_id: DbId,
    file: UploadedFile,
) -> AppResult<PromptResult> {
    load_owned_prompt(store, owner, prompt_id).await?;
    let now = chrono::Utc::now().timestamp_millis();
    let key = scoped_key(prompt_id, now, &file.file_name);
    store_image(store, storage, prompt_id, &key, file).await
}

/// Upload several images under flat keys.
///
/// Each file succeeds or fails on its own; a failure is reported in its
/// outcome and the remaining files are still processed.
pub async fn upload_batch(
    store: &dyn RecordStore,
    storage: &dyn StorageGateway,
    owner: DbId,
    prompt_id: DbId,
    files: Vec<UploadedFile>,
) -> AppResult<Vec<UploadOutcome>> {
    if files.is_empty() {
        return Err(AppError::BadRequest("No files uploaded".into()));
    }
    load_owned_prompt(store, owner, prompt_id).await?;

    let mut outcomes = Vec::with_capacity(files.len());
    let mut last_ts = i64::MIN;
    for file in files {
        // Strictly increasing timestamps keep same-named files apart.
        let ts = chrono::Utc::now().timestamp_millis().max(last_ts.saturating_add(1));
        last_ts = ts;

        let file_name = file.file_name.clone();
        let key = flat_key(ts, &file_name);
        match store_image(store, storage, prompt_id, &key, file).await {
            Ok(result) => outcomes.push(UploadOutcome {
                file_name,
                result: Some(result),
                error: None,
            }),
            Err(e) => {
                tracing::warn!(prompt_id, file = %file_name, error = %e, "Batch upload item failed");
                outcomes.push(UploadOutcome {
                    file_name,
                    result: None,
                    error: Some(e.to_string()),
                })
            }
        }
    }
    Ok(outcomes)
}

/// Delete one result. For images the stored object goes first; if that
/// fails the row is kept and the storage error returned.
pub async fn delete_result(
    store: &dyn RecordStore,
    storage: &dyn StorageGateway,
    owner: DbId,
    result_id: DbId,
) -> AppResult<()> {
    let result = store
        .find_result(result_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Result", result_id))?;
    load_owned_prompt(store, owner, result.prompt_id).await?;

    if let Some(key) = image_key(&result, storage.bucket()) {
        storage.remove(std::slice::from_ref(&key)).await?;
    }
    if !store.delete_result(result_id).await? {
        return Err(CoreError::not_found("Result", result_id).into());
    }
    tracing::info!(result_id, user_id = owner, "Result deleted");
    Ok(())
}

/// Delete many results of the caller's in one go.
///
/// Every id must name a result on one of the caller's prompts, otherwise
/// nothing is touched. All backing objects are removed in one storage call
/// before the rows.
pub async fn batch_delete(
    store: &dyn RecordStore,
    storage: &dyn StorageGateway,
    owner: DbId,
    ids: &[DbId],
) -> AppResult<u64> {
    if ids.is_empty() {
        return Err(AppError::BadRequest("ids must not be empty".into()));
    }
    let wanted: Vec<DbId> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();

    let found = store.find_results_for_owner(owner, &wanted).await?;
    if found.len() != wanted.len() {
        let found_ids: BTreeSet<DbId> = found.iter().map(|r| r.id).collect();
        let missing = wanted
            .iter()
            .find(|id| !found_ids.contains(id))
            .copied()
            .unwrap_or_default();
        return Err(CoreError::not_found("Result", missing).into());
    }

    let keys: Vec<String> = found
        .iter()
        .filter_map(|r| image_key(r, storage.bucket()))
        .collect();
    if !keys.is_empty() {
        storage.remove(&keys).await?;
    }

    let deleted = store.delete_results(&wanted).await?;
    tracing::info!(user_id = owner, deleted, objects = keys.len(), "Results batch-deleted");
    Ok(deleted)
}

/// Attach signed URLs to `results`, signing every image concurrently.
pub async fn sign_results(
    storage: &dyn StorageGateway,
    results: Vec<PromptResult>,
    ttl: Duration,
) -> Vec<SignedResult> {
    let signing = results.iter().map(|result| async move {
        let key = image_key(result, storage.bucket())?;
        match storage.sign(&key, ttl).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(result_id = result.id, key = %key, error = %e, "Signing failed");
                None
            }
        }
    });
    let urls = join_all(signing).await;

    results
        .into_iter()
        .zip(urls)
        .map(|(result, signed_url)| SignedResult { result, signed_url })
        .collect()
}

/// Render the image results among `results` as CSV, `None` if there are
/// none.
pub fn export_csv(results: &[PromptResult]) -> Option<String> {
    let rows: Vec<ExportRow<'_>> = results
        .iter()
        .filter(|r| r.kind == ResultKind::Image)
        .map(|r| ExportRow {
            id: r.id,
            file_path: r.file_path.as_deref(),
            url: &r.content,
            size: r.size,
            created_at: r.created_at,
        })
        .collect();
    if rows.is_empty() {
        None
    } else {
        Some(render_csv(rows))
    }
}
