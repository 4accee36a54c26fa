/**
 * Session Tokens
 *
 * Sessions are issued by the external auth provider as HS256 JWTs signed
 * with a shared secret. This module verifies them and, for tests and local
 * tooling, mints them.
 *
 * # Claims
 *
 * - `sub` - user id (UUID)
 * - `username` - display name (optional)
 * - `is_anonymous` - `true` for guest sessions
 * - `exp` / `iat` - expiry and issue time (Unix seconds)
 */

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifetime of minted tokens (30 days)
const TOKEN_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Username, absent for guests that never picked one
    #[serde(default)]
    pub username: Option<String>,
    /// Anonymous guest session
    #[serde(default)]
    pub is_anonymous: bool,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

impl Claims {
    /// Parse the subject as a user id
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}

/// HS256 signing and verification keys
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JwtKeys(..)")
    }
}

/// Create a session token
///
/// # Arguments
/// * `keys` - Signing keys
/// * `user_id` - User ID (UUID)
/// * `username` - Display name, if any
/// * `is_anonymous` - Whether this is a guest session
///
/// # Returns
/// JWT token string
pub fn create_token(
    keys: &JwtKeys,
    user_id: Uuid,
    username: Option<&str>,
    is_anonymous: bool,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.map(str::to_string),
        is_anonymous,
        exp: (now + TOKEN_TTL_SECONDS) as u64,
        iat: now as u64,
    };

    encode(&Header::default(), &claims, &keys.encoding)
}

/// Verify and decode a session token
///
/// # Errors
/// Fails on a bad signature, an expired token or malformed claims.
pub fn verify_token(keys: &JwtKeys, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(token, &keys.decoding, &Validation::default())?;
    Ok(token_data.claims)
}
