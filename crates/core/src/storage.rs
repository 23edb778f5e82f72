//! Object-storage key layout, URL formats, and result kinds.
//!
//! Two key layouts are in use:
//!
//! - flat: `{timestamp}_{filename}` (bulk uploads)
//! - scoped: `{promptId}/{timestamp}-{filename}` (uploads attached to one prompt)
//!
//! Public URLs look like `{baseUrl}/storage/v1/object/public/{bucket}/{key}`
//! and are what image results store as their content reference.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default bucket holding result artifacts.
pub const DEFAULT_BUCKET: &str = "results";

/// Path prefix of public object URLs.
pub const PUBLIC_OBJECT_PATH: &str = "/storage/v1/object/public";

/// Path prefix of signed object URLs served by the local backend.
pub const SIGNED_OBJECT_PATH: &str = "/storage/v1/object/sign";

/// Maximum key length accepted by the gateway.
pub const MAX_KEY_LENGTH: usize = 512;

/// Longest file-name fragment kept inside a generated key.
const MAX_FILE_NAME_LENGTH: usize = 120;

// ---------------------------------------------------------------------------
// Result kinds
// ---------------------------------------------------------------------------

/// Kind of a result artifact attached to a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Text,
    Image,
}

impl ResultKind {
    /// Parse from the database `type` column.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            other => Err(CoreError::Validation(format!(
                "Unknown result type '{other}'. Must be one of: text, image"
            ))),
        }
    }

    /// Database `type` column value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

// ---------------------------------------------------------------------------
// Key building
// ---------------------------------------------------------------------------

/// Replace anything outside `[A-Za-z0-9._-]` with `_` and drop directory
/// components, so a client-supplied name can never escape its key prefix.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILE_NAME_LENGTH)
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Flat key: `{timestamp_millis}_{filename}`.
pub fn flat_key(timestamp_millis: i64, file_name: &str) -> String {
    format!("{timestamp_millis}_{}", sanitize_file_name(file_name))
}

/// Prompt-scoped key: `{promptId}/{timestamp_millis}-{filename}`.
pub fn scoped_key(prompt_id: DbId, timestamp_millis: i64, file_name: &str) -> String {
    format!("{prompt_id}/{timestamp_millis}-{}", sanitize_file_name(file_name))
}

/// Reject keys that are empty, absolute, too long, or contain `.`/`..`
/// segments.
pub fn validate_key(key: &str) -> Result<(), CoreError> {
    if key.is_empty() || key.len() > MAX_KEY_LENGTH {
        return Err(CoreError::Validation(format!(
            "Storage key must be 1..={MAX_KEY_LENGTH} bytes"
        )));
    }
    if key.starts_with('/') || key.contains('\\') {
        return Err(CoreError::Validation(format!("Invalid storage key '{key}'")));
    }
    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(CoreError::Validation(format!("Invalid storage key '{key}'")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// URLs
// ---------------------------------------------------------------------------

/// Public URL of `key` inside `bucket`.
pub fn public_url(base_url: &str, bucket: &str, key: &str) -> String {
    format!(
        "{}{PUBLIC_OBJECT_PATH}/{bucket}/{key}",
        base_url.trim_end_matches('/')
    )
}

/// Recover the storage key from a stored public URL.
///
/// Returns `None` when the URL does not point into `bucket`.
pub fn key_from_public_url(url: &str, bucket: &str) -> Option<String> {
    let marker = format!("{PUBLIC_OBJECT_PATH}/{bucket}/");
    let (_, key) = url.split_once(&marker)?;
    let key = key.split(['?', '#']).next().unwrap_or(key);
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_kind_round_trips_names() {
        assert_eq!(ResultKind::from_name("image").unwrap(), ResultKind::Image);
        assert_eq!(ResultKind::Text.name(), "text");
        assert!(ResultKind::from_name("video").is_err());
    }

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_file_name("C:\\tmp\\a.jpg"), "a.jpg");
        assert_eq!(sanitize_file_name("..."), "file");
        assert_eq!(sanitize_file_name(""), "file");
    }

    #[test]
    fn key_layouts() {
        assert_eq!(flat_key(1700000000000, "cat.png"), "1700000000000_cat.png");
        assert_eq!(scoped_key(42, 1700000000000, "cat.png"), "42/1700000000000-cat.png");
    }

    #[test]
    fn generated_keys_are_valid() {
        assert!(validate_key(&scoped_key(7, 1, "../../x.png")).is_ok());
        assert!(validate_key(&flat_key(1, "a b.png")).is_ok());
    }

    #[test]
    fn traversal_keys_are_rejected() {
        assert!(validate_key("").is_err());
        assert!(validate_key("/abs.png").is_err());
        assert!(validate_key("a/../b.png").is_err());
        assert!(validate_key("a//b.png").is_err());
        assert!(validate_key("a\\b.png").is_err());
    }

    #[test]
    fn public_url_and_back() {
        let url = public_url("https://cdn.example.com/", "results", "42/1-cat.png");
        assert_eq!(
            url,
            "https://cdn.example.com/storage/v1/object/public/results/42/1-cat.png"
        );
        assert_eq!(key_from_public_url(&url, "results").as_deref(), Some("42/1-cat.png"));
    }

    #[test]
    fn key_from_foreign_url_is_none() {
        assert_eq!(key_from_public_url("https://elsewhere.example/cat.png", "results"), None);
        assert_eq!(
            key_from_public_url("https://x/storage/v1/object/public/other/cat.png", "results"),
            None
        );
        assert_eq!(
            key_from_public_url("https://x/storage/v1/object/public/results/", "results"),
            None
        );
    }

    #[test]
    fn key_from_url_drops_query() {
        assert_eq!(
            key_from_public_url("https://x/storage/v1/object/public/results/a.png?v=2", "results")
                .as_deref(),
            Some("a.png")
        );
    }
}
