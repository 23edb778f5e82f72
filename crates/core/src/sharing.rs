//! Public share slugs.
//!
//! A slug is the sole capability for anonymous read access to a shared
//! prompt, so it is drawn from the thread-local CSPRNG (ChaCha, seeded from
//! the OS) and never from a counter.

use rand::Rng;

/// URL-safe alphabet (64 symbols, 6 bits of entropy per character).
pub const SLUG_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Default slug length.
pub const DEFAULT_SLUG_LENGTH: usize = 10;

/// Shortest slug length accepted by configuration.
pub const MIN_SLUG_LENGTH: usize = 8;

/// Longest slug [`is_well_formed_slug`] lets through.
pub const MAX_SLUG_LENGTH: usize = 64;

/// Default number of insert attempts before giving up on slug collisions.
pub const DEFAULT_MAX_SLUG_ATTEMPTS: u32 = 5;

/// Default lifetime of signed URLs handed out by shared views.
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 3600;

/// Generate a random slug of `len` characters from [`SLUG_ALPHABET`].
pub fn generate_slug(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| SLUG_ALPHABET[rng.random_range(0..SLUG_ALPHABET.len())] as char)
        .collect()
}

/// Whether slugs of `len` characters can be issued and later resolved.
pub fn is_supported_slug_length(len: usize) -> bool {
    (MIN_SLUG_LENGTH..=MAX_SLUG_LENGTH).contains(&len)
}

/// Cheap syntactic check run before hitting the store with an arbitrary path
/// segment. Never reveals whether the slug exists.
pub fn is_well_formed_slug(slug: &str) -> bool {
    !slug.is_empty() && slug.len() <= MAX_SLUG_LENGTH && slug.bytes().all(|b| SLUG_ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn slug_has_requested_length() {
        assert_eq!(generate_slug(DEFAULT_SLUG_LENGTH).len(), DEFAULT_SLUG_LENGTH);
        assert_eq!(generate_slug(21).len(), 21);
    }

    #[test]
    fn slug_uses_only_url_safe_characters() {
        for _ in 0..100 {
            assert!(is_well_formed_slug(&generate_slug(DEFAULT_SLUG_LENGTH)));
        }
    }

    #[test]
    fn slugs_do_not_repeat_in_practice() {
        let slugs: HashSet<String> = (0..1_000).map(|_| generate_slug(DEFAULT_SLUG_LENGTH)).collect();
        assert_eq!(slugs.len(), 1_000);
    }

    #[test]
    fn malformed_slugs_are_rejected() {
        assert!(!is_well_formed_slug(""));
        assert!(!is_well_formed_slug("../etc"));
        assert!(!is_well_formed_slug("has space"));
        assert!(!is_well_formed_slug(&"a".repeat(MAX_SLUG_LENGTH + 1)));
    }

    #[test]
    fn every_supported_length_yields_resolvable_slugs() {
        for len in MIN_SLUG_LENGTH..=MAX_SLUG_LENGTH {
            assert!(is_supported_slug_length(len));
            assert!(is_well_formed_slug(&generate_slug(len)), "length {len}");
        }
        assert!(!is_supported_slug_length(MIN_SLUG_LENGTH - 1));
        assert!(!is_supported_slug_length(MAX_SLUG_LENGTH + 1));
        assert!(!is_supported_slug_length(80));
    }
}
