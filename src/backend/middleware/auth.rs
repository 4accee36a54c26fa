/**
 * Authentication Extractors
 *
 * `AuthUser` verifies the caller's session token, upserts the matching
 * profile row and hands the handler a `SessionUser`. `CronGuard` protects
 * the scheduled cleanup endpoints with a shared secret.
 *
 * # Token sources
 *
 * 1. `Authorization: Bearer <token>`
 * 2. `?access_token=<token>` query parameter, for EventSource-style
 *    subscriptions that cannot set headers
 */

use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::backend::auth::{profiles::upsert_profile, sessions::verify_token};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Header accepted as an alternative to `Authorization` for cron callers
pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

/// Verified caller identity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub username: String,
    /// Anonymous guest session
    pub is_guest: bool,
}

impl SessionUser {
    /// Reject guests for actions that need a registered account
    ///
    /// # Arguments
    /// * `action` - Verb phrase used in the error, e.g. "create rooms"
    pub fn require_account(&self, action: &str) -> Result<(), BackendError> {
        if self.is_guest {
            tracing::warn!("[Auth] Guest {} tried to {}", self.user_id, action);
            return Err(BackendError::guest_restricted(action));
        }
        Ok(())
    }
}

/// Axum extractor for an authenticated caller
#[derive(Clone, Debug)]
pub struct AuthUser(pub SessionUser);

/// Extract a bearer token from the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verify a token and upsert the caller's profile
///
/// # Errors
/// * `401 Unauthorized` - invalid or expired token
/// * `500` - profile upsert failed
pub async fn authenticate_token(state: &AppState, token: &str) -> Result<SessionUser, BackendError> {
    let claims = verify_token(&state.jwt, token).map_err(|e| {
        tracing::warn!("[Auth] Invalid token: {:?}", e);
        BackendError::unauthorized("Invalid or expired session")
    })?;

    let user_id = claims.user_id().map_err(|e| {
        tracing::warn!("[Auth] Invalid user ID in token: {:?}", e);
        BackendError::unauthorized("Invalid or expired session")
    })?;

    let profile = upsert_profile(&state.pool, user_id, claims.username.as_deref(), claims.is_anonymous).await?;

    Ok(SessionUser {
        user_id,
        username: profile.username,
        is_guest: profile.is_guest,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = match bearer_token(&parts.headers) {
            Some(token) => token.to_string(),
            None => Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(params)| params.get("access_token").cloned())
                .filter(|token| !token.is_empty())
                .ok_or_else(|| {
                    tracing::debug!("[Auth] Missing session token");
                    BackendError::unauthorized("Authentication required")
                })?,
        };

        let user = authenticate_token(state, &token).await?;
        Ok(AuthUser(user))
    }
}

/// Extractor guarding scheduled cleanup endpoints
///
/// Passes unconditionally in development mode. Otherwise the request must
/// carry the configured `CRON_SECRET` as a bearer token or in the
/// `x-cron-secret` header.
#[derive(Clone, Copy, Debug)]
pub struct CronGuard;

impl FromRequestParts<AppState> for CronGuard {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if state.config.is_development() {
            tracing::debug!("[Cron] Development mode, secret check bypassed");
            return Ok(CronGuard);
        }

        let expected = state.config.cron_secret.as_deref().ok_or_else(|| {
            tracing::warn!("[Cron] CRON_SECRET not configured, rejecting cleanup call");
            BackendError::unauthorized("Invalid cron secret")
        })?;

        let provided = bearer_token(&parts.headers).or_else(|| {
            parts
                .headers
                .get(CRON_SECRET_HEADER)
                .and_then(|h| h.to_str().ok())
        });

        if provided.is_some_and(|secret| constant_time_eq(secret.as_bytes(), expected.as_bytes())) {
            Ok(CronGuard)
        } else {
            tracing::warn!("[Cron] Rejected cleanup call with missing or wrong secret");
            Err(BackendError::unauthorized("Invalid cron secret"))
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
