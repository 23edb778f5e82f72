//! Session tokens.
//!
//! A session is an HS256 JWT whose subject is the user id. Clients may send
//! it as `Authorization: Bearer ...` or in the `access_token` cookie (see
//! [`crate::middleware::auth`]).

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use promptshelf_core::types::DbId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: DbId,
    /// E-mail at issue time. Informational only; the id is authoritative.
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Secret and lifetime for session tokens.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
}

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;

/// Clock skew tolerated when checking `exp`.
const LEEWAY_SECS: u64 = 30;

impl JwtConfig {
    /// Reads `JWT_SECRET` (required) and `JWT_ACCESS_EXPIRY_MINS`
    /// (default 60).
    ///
    /// # Panics
    ///
    /// On a missing or empty secret, or a lifetime that is not a positive
    /// number of minutes.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .expect("JWT_SECRET must be set to a non-empty value");

        let access_token_expiry_mins = match std::env::var("JWT_ACCESS_EXPIRY_MINS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|mins| *mins > 0)
                .expect("JWT_ACCESS_EXPIRY_MINS must be a positive integer"),
            Err(_) => DEFAULT_ACCESS_EXPIRY_MINS,
        };

        Self {
            secret,
            access_token_expiry_mins,
        }
    }

    /// Token lifetime in seconds, as reported to clients.
    pub fn expires_in_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = LEEWAY_SECS;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}

/// A freshly signed token and its lifetime.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_in: i64,
}

/// Sign a session token for `user_id`.
pub fn generate_access_token(
    user_id: DbId,
    email: &str,
    config: &JwtConfig,
) -> Result<AccessToken, jsonwebtoken::errors::Error> {
    let iat = chrono::Utc::now().timestamp();
    let expires_in = config.expires_in_secs();
    let claims = Claims {
        sub: user_id,
        email: email.to_owned(),
        exp: iat + expires_in,
        iat,
        jti: Uuid::new_v4().to_string(),
    };

    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;
    Ok(AccessToken { token, expires_in })
}

/// Check signature and expiry, returning the claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &JwtConfig::validation(),
    )
    .map(|data| data.claims)
}
