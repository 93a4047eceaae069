use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod api;
mod auth;
mod config;
mod error;
mod maintenance;
mod state;

use config::Config;
use state::AppState;

pub fn build_router(state: Arc<AppState>, allowed_origin: Option<HeaderValue>) -> Router {
    let mut app = Router::new()
        .route("/api/auth/sign-in", post(api::sign_in::sign_in))
        .route("/api/auth/session", get(api::sign_in::current_session))
        .route("/api/auth/sign-out", post(api::sign_in::sign_out))
        .with_state(state);

    if let Some(origin) = allowed_origin {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        );
    }

    app.layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        max_attempts = config.limits.max_attempts(),
        block_secs = config.limits.block_duration().as_secs(),
        window_secs = config.limits.window_duration().as_secs(),
        scope = ?config.lockout_scope,
        "Login lockout configured"
    );

    let state = Arc::new(AppState::new(&config));
    let sweeper = maintenance::spawn_sweeper(state.clone(), config.sweep_interval);

    let app = build_router(state, config.allowed_origin.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Sign-in server listening on {}", config.bind_addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.abort();
    Ok(())
}
