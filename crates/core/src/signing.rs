//! HMAC-SHA256 tokens for time-limited object URLs.
//!
//! A token has the form `{expires_at}.{hex_signature}` where the signature
//! covers `{bucket}/{key}:{expires_at}`. The local storage backend issues
//! them and the API verifies them when serving the object.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Reasons a signed-URL token is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("token expired")]
    Expired,
    #[error("signature mismatch")]
    BadSignature,
}

fn mac_for(secret: &[u8], bucket: &str, key: &str, expires_at: i64) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(bucket.as_bytes());
    mac.update(b"/");
    mac.update(key.as_bytes());
    mac.update(b":");
    mac.update(expires_at.to_string().as_bytes());
    mac
}

/// Issue a token for `bucket/key` valid until `expires_at` (Unix seconds).
pub fn sign_object(secret: &[u8], bucket: &str, key: &str, expires_at: i64) -> String {
    let signature = mac_for(secret, bucket, key, expires_at).finalize().into_bytes();
    format!("{expires_at}.{}", hex::encode(signature))
}

/// Verify a token for `bucket/key` at time `now` (Unix seconds).
///
/// The signature comparison is constant-time.
pub fn verify_object(
    secret: &[u8],
    bucket: &str,
    key: &str,
    token: &str,
    now: i64,
) -> Result<(), TokenError> {
    let (expires_at, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
    let expires_at: i64 = expires_at.parse().map_err(|_| TokenError::Malformed)?;
    let signature = hex::decode(signature).ok_or(TokenError::Malformed)?;

    mac_for(secret, bucket, key, expires_at)
        .verify_slice(&signature)
        .map_err(|_| TokenError::BadSignature)?;

    if now >= expires_at {
        return Err(TokenError::Expired);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// hex helpers (no extra dep)
// ---------------------------------------------------------------------------

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Decode a lowercase or uppercase hex string. `None` on odd length or
    /// non-hex input.
    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"storage-signing-secret";

    #[test]
    fn valid_token_verifies() {
        let token = sign_object(SECRET, "results", "42/1-cat.png", 2_000);
        assert_eq!(verify_object(SECRET, "results", "42/1-cat.png", &token, 1_000), Ok(()));
    }

    #[test]
    fn expired_token_is_refused() {
        let token = sign_object(SECRET, "results", "a.png", 1_000);
        assert_eq!(
            verify_object(SECRET, "results", "a.png", &token, 1_000),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn token_is_bound_to_key_and_bucket() {
        let token = sign_object(SECRET, "results", "a.png", 2_000);
        assert_eq!(
            verify_object(SECRET, "results", "b.png", &token, 1_000),
            Err(TokenError::BadSignature)
        );
        assert_eq!(
            verify_object(SECRET, "other", "a.png", &token, 1_000),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn extending_expiry_breaks_signature() {
        let token = sign_object(SECRET, "results", "a.png", 2_000);
        let (_, sig) = token.split_once('.').unwrap();
        let forged = format!("9999999999.{sig}");
        assert_eq!(
            verify_object(SECRET, "results", "a.png", &forged, 1_000),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(
            verify_object(SECRET, "results", "a.png", "nope", 0),
            Err(TokenError::Malformed)
        );
        assert_eq!(
            verify_object(SECRET, "results", "a.png", "12.zz", 0),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn different_secret_fails() {
        let token = sign_object(SECRET, "results", "a.png", 2_000);
        assert_eq!(
            verify_object(b"another-secret", "results", "a.png", &token, 1_000),
            Err(TokenError::BadSignature)
        );
    }
}
