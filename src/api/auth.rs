use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

/// Marker extractor for handlers that require an authenticated caller.
///
/// With no token configured every caller is admitted.
pub struct AuthUser;

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.api_token.as_deref() else {
            return Ok(AuthUser);
        };

        let provided = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token);

        match provided {
            Some(token) if tokens_match(token, expected) => Ok(AuthUser),
            Some(_) => {
                warn!("rejected request to {} with an invalid token", parts.uri.path());
                Err(AppError::Unauthorized)
            }
            None => {
                warn!("rejected unauthenticated request to {}", parts.uri.path());
                Err(AppError::Unauthorized)
            }
        }
    }
}

/// Extracts the credentials of a `Bearer` authorization header. The scheme
/// name is case-insensitive.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|token| !token.is_empty())
}

/// Compares every byte regardless of where the first mismatch is.
fn tokens_match(provided: &str, expected: &str) -> bool {
    let (provided, expected) = (provided.as_bytes(), expected.as_bytes());
    if provided.len() != expected.len() {
        return false;
    }
    provided
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
