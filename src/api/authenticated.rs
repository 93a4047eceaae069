use std::sync::Arc;
use std::time::Instant;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};

use crate::auth::session::Session;
use crate::error::AppError;
use crate::state::AppState;

/// A live session resolved from the request's `Authorization: Bearer` token.
pub struct AuthenticatedSession(pub Session);

fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header value"))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or(AppError::Unauthorized("Expected Bearer token"))
}

impl FromRequestParts<Arc<AppState>> for AuthenticatedSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let session = state
            .sessions
            .lock()
            .await
            .get(&token, Instant::now())
            .cloned()
            .ok_or(AppError::Unauthorized("Invalid or expired session"))?;

        Ok(AuthenticatedSession(session))
    }
}
