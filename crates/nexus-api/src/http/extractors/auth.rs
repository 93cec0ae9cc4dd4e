//! Optional session authentication extractor.
//!
//! Resolves the caller's identity from an `Authorization: Bearer <token>`
//! header. Tokens are SHA-256 hashed and compared against the
//! `user_sessions` table. Session minting belongs to the external auth
//! integration; [`mint_session`] exists for provisioning and tests.
//!
//! Anonymous callers are first-class on the chat surface, so a missing or
//! unknown token never rejects the request -- the extractor resolves to
//! `CurrentUser(None)`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};
use sqlx::Row;

use crate::http::error::AppError;
use crate::state::AppState;

/// The caller's identity, if any. Extracting this never fails the request.
pub struct CurrentUser(pub Option<String>);

impl CurrentUser {
    pub fn user_id(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_bearer_token(parts) else {
            return Ok(CurrentUser(None));
        };

        let token_hash = hash_session_token(&token);

        let row = sqlx::query("SELECT user_id FROM user_sessions WHERE token_hash = ?")
            .bind(&token_hash)
            .fetch_optional(&state.db_pool.reader)
            .await
            .map_err(|e| AppError::Internal(format!("Database error: {e}")))?;

        match row {
            Some(row) => {
                let user_id: String = row
                    .try_get("user_id")
                    .map_err(|e| AppError::Internal(format!("Database error: {e}")))?;
                Ok(CurrentUser(Some(user_id)))
            }
            // Unknown tokens degrade to anonymous rather than rejecting.
            None => Ok(CurrentUser(None)),
        }
    }
}

/// Extract the bearer token from the Authorization header, if present.
fn extract_bearer_token(parts: &Parts) -> Option<String> {
    let auth = parts.headers.get("authorization")?;
    let auth_str = auth.to_str().ok()?;
    auth_str
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

/// Compute SHA-256 hash of a session token (lowercase hex).
pub fn hash_session_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{:x}", digest)
}

/// Create a session for `user_id` and return the plaintext token.
///
/// Only the hash is stored; the token is shown once.
pub async fn mint_session(state: &AppState, user_id: &str) -> anyhow::Result<String> {
    use rand::RngCore;

    let mut token_bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut token_bytes);
    let token = format!(
        "nexus_{}",
        token_bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>()
    );

    let token_hash = hash_session_token(&token);
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query("INSERT INTO user_sessions (token_hash, user_id, created_at) VALUES (?, ?, ?)")
        .bind(&token_hash)
        .bind(user_id)
        .bind(&now)
        .execute(&state.db_pool.writer)
        .await?;

    Ok(token)
}
