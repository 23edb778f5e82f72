//! Input validation and normalization for prompts, tags, and accounts.
//!
//! Every function here is pure. Callers run them before touching the record
//! store so that invalid input never produces a write.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum prompt content length in characters.
pub const MAX_PROMPT_CONTENT_LENGTH: usize = 20_000;

/// Maximum prompt title length in characters.
pub const MAX_PROMPT_TITLE_LENGTH: usize = 200;

/// Maximum tag name length in characters.
pub const MAX_TAG_NAME_LENGTH: usize = 64;

/// Maximum text result length in characters.
pub const MAX_TEXT_RESULT_LENGTH: usize = 100_000;

/// Maximum e-mail length accepted at signup.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

/// Validate prompt content: required, non-empty after trimming, within limit.
///
/// Returns the content unchanged (surrounding whitespace is kept, only the
/// emptiness check uses the trimmed form).
pub fn validate_prompt_content(content: &str) -> Result<&str, CoreError> {
    if content.trim().is_empty() {
        return Err(CoreError::Validation(
            "Prompt content must not be empty".to_string(),
        ));
    }
    let len = content.chars().count();
    if len > MAX_PROMPT_CONTENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Prompt content exceeds maximum length of {MAX_PROMPT_CONTENT_LENGTH} characters (got {len})"
        )));
    }
    Ok(content)
}

/// Normalize an optional prompt title.
///
/// Whitespace-only titles collapse to `None`.
pub fn normalize_prompt_title(title: Option<&str>) -> Result<Option<String>, CoreError> {
    let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    let len = title.chars().count();
    if len > MAX_PROMPT_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Prompt title exceeds maximum length of {MAX_PROMPT_TITLE_LENGTH} characters (got {len})"
        )));
    }
    Ok(Some(title.to_string()))
}

/// Validate the body of a text result.
pub fn validate_text_result(content: &str) -> Result<&str, CoreError> {
    if content.trim().is_empty() {
        return Err(CoreError::Validation(
            "Text result content must not be empty".to_string(),
        ));
    }
    if content.len() > MAX_TEXT_RESULT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Text result exceeds maximum length of {MAX_TEXT_RESULT_LENGTH} bytes"
        )));
    }
    Ok(content)
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Normalize a tag name: trim surrounding whitespace. Case is preserved.
pub fn normalize_tag_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Tag name must not be empty".to_string(),
        ));
    }
    let len = trimmed.chars().count();
    if len > MAX_TAG_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Tag name exceeds maximum length of {MAX_TAG_NAME_LENGTH} characters (got {len})"
        )));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Normalize an e-mail address: trim and lowercase, require a single `@`
/// with something on both sides.
pub fn normalize_email(email: &str) -> Result<String, CoreError> {
    let email = email.trim().to_lowercase();
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(CoreError::Validation("E-mail address is too long".into()));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email)
        }
        _ => Err(CoreError::Validation(format!(
            "'{email}' is not a valid e-mail address"
        ))),
    }
}

/// Validate that a password meets the minimum length requirement.
pub fn validate_password_strength(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn prompt_content_rejects_empty_and_whitespace() {
        assert_matches!(validate_prompt_content(""), Err(CoreError::Validation(_)));
        assert_matches!(validate_prompt_content("   \n\t "), Err(CoreError::Validation(_)));
    }

    #[test]
    fn prompt_content_keeps_original_text() {
        assert_eq!(validate_prompt_content("  hello ").unwrap(), "  hello ");
    }

    #[test]
    fn prompt_content_length_limit() {
        let long = "a".repeat(MAX_PROMPT_CONTENT_LENGTH + 1);
        assert!(validate_prompt_content(&long).is_err());
        let max = "a".repeat(MAX_PROMPT_CONTENT_LENGTH);
        assert!(validate_prompt_content(&max).is_ok());
    }

    #[test]
    fn blank_title_becomes_none() {
        assert_eq!(normalize_prompt_title(Some("   ")).unwrap(), None);
        assert_eq!(normalize_prompt_title(None).unwrap(), None);
        assert_eq!(
            normalize_prompt_title(Some(" Draft ")).unwrap().as_deref(),
            Some("Draft")
        );
    }

    #[test]
    fn tag_name_is_trimmed_not_lowercased() {
        assert_eq!(normalize_tag_name("  Demo ").unwrap(), "Demo");
    }

    #[test]
    fn tag_name_rejects_blank() {
        assert_matches!(normalize_tag_name(" "), Err(CoreError::Validation(_)));
    }

    #[test]
    fn tag_name_counts_characters_not_bytes() {
        let name = "é".repeat(MAX_TAG_NAME_LENGTH);
        assert!(normalize_tag_name(&name).is_ok());
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(normalize_email(" Ada@Example.COM ").unwrap(), "ada@example.com");
    }

    #[test]
    fn email_without_at_is_rejected() {
        assert!(normalize_email("nobody").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("a@b@c").is_err());
    }

    #[test]
    fn password_length_rule() {
        assert!(validate_password_strength("short").is_err());
        assert!(validate_password_strength("long enough").is_ok());
    }

    #[test]
    fn text_result_must_not_be_blank() {
        assert!(validate_text_result(" ").is_err());
        assert!(validate_text_result("output").is_ok());
    }
}
