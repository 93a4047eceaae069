use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::authenticated::AuthenticatedSession;
use crate::auth::brute_force::{BlockState, FailureOutcome};
use crate::auth::credentials::{Credentials, SignInRequest};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub user: UserInfo,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserInfo,
    pub expires_at: DateTime<Utc>,
}

pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<SignInResponse>, AppError> {
    let Json(req) = payload?;
    let creds = Credentials::try_from(req)?;
    let key = state.lockout_scope.key(addr.ip(), &creds.email);

    // Locked out keys never reach the credential check
    if let BlockState::Blocked { remaining } =
        state.login_tracker.is_blocked(&key, Instant::now())
    {
        tracing::debug!(key = %key, "Sign-in rejected during lockout");
        return Err(AppError::TooManyAttempts {
            retry_after: remaining,
        });
    }

    let demo = &state.demo_account;
    if creds.matches(&demo.email, &demo.password) {
        state.login_tracker.record_success(&key);
        let session = state
            .sessions
            .lock()
            .await
            .create(&demo.email, &demo.name, Instant::now());
        tracing::info!(email = %session.email, "Signed in");

        return Ok(Json(SignInResponse {
            token: session.token,
            user: UserInfo {
                email: session.email,
                name: session.name,
            },
            expires_at: session.expires_at,
        }));
    }

    let now = Instant::now();
    match state.login_tracker.record_failure(&key, now) {
        FailureOutcome::Counted { remaining } => {
            tracing::debug!(key = %key, remaining, "Failed sign-in");
            Err(AppError::Unauthorized("Invalid email or password."))
        }
        FailureOutcome::Blocked { expires } | FailureOutcome::AlreadyBlocked { expires } => {
            Err(AppError::TooManyAttempts {
                retry_after: expires.saturating_duration_since(now),
            })
        }
    }
}

pub async fn current_session(
    AuthenticatedSession(session): AuthenticatedSession,
) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: UserInfo {
            email: session.email,
            name: session.name,
        },
        expires_at: session.expires_at,
    })
}

pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    AuthenticatedSession(session): AuthenticatedSession,
) -> StatusCode {
    state.sessions.lock().await.remove(&session.token);
    tracing::info!(email = %session.email, "Signed out");
    StatusCode::NO_CONTENT
}
