//! Admin bearer-token authentication.
//!
//! Only the SHA-256 digest of the admin token is configured. A request's token (with or
//! without the `Bearer ` prefix) is hashed and compared against it.

use crate::api::{error::AppError, state::AppState};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use tracing::warn;

/// Rejection message when no token was sent
pub const MISSING_TOKEN: &str = "Unauthenticated. Token required.";
/// Rejection message when the token does not match
pub const INVALID_TOKEN: &str = "Invalid authentication token.";

/// Hex-encoded SHA-256 digest of `token`.
#[must_use]
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim_start();
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    (!token.is_empty()).then_some(token)
}

fn token_matches(state: &AppState, token: &str) -> bool {
    state
        .admin_token_sha256
        .as_deref()
        .is_some_and(|expected| token_digest(token).eq_ignore_ascii_case(expected))
}

/// Whether `headers` carry a valid admin token. Used by public routes that show more
/// to admins.
pub fn is_admin(state: &AppState, headers: &HeaderMap) -> bool {
    bearer_token(headers).is_some_and(|token| token_matches(state, token))
}

/// Rejects the request unless it carries the admin token.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).ok_or(AppError::Unauthenticated(MISSING_TOKEN))?;
    if !token_matches(&state, token) {
        warn!(path = %req.uri().path(), "Rejected admin request with invalid token");
        return Err(AppError::Unauthenticated(INVALID_TOKEN));
    }
    Ok(next.run(req).await)
}
