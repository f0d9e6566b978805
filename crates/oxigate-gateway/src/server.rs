//! Axum server for the OpenAI-compatible gateway.
//!
//! The registry and auth chain are built before the listener starts serving
//! and are read-only afterwards.

use std::path::Path;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use oxigate_core::config::Config;
use oxigate_core::utils::expand_home;

use crate::auth::{require_auth, AuthChain};
use crate::factory::{build_auth_chain, build_registry};
use crate::handlers::{self, AppState};
use crate::registry::Registry;

/// Build the router over a ready registry and auth chain.
pub fn router(state: AppState, auth: Arc<AuthChain>, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/v1/models", get(handlers::models::list_models))
        .route("/v1/chat/completions", post(handlers::chat::chat_completions))
        .route("/v1/embeddings", post(handlers::embeddings::embeddings))
        .route("/v1/images/generations", post(handlers::media::generate_image))
        .route("/v1/audio/speech", post(handlers::media::synthesize_speech))
        .route(
            "/v1/audio/transcriptions",
            post(handlers::media::transcribe_audio)
                .layer(DefaultBodyLimit::max(handlers::media::MAX_AUDIO_UPLOAD)),
        )
        .nest_service("/files", ServeDir::new(static_dir))
        .with_state(state)
        .layer(middleware::from_fn_with_state(auth, require_auth))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Build the full application from configuration.
pub fn app(config: &Config, shutdown: CancellationToken) -> Router {
    let registry: Arc<Registry> = Arc::new(build_registry(config));
    let auth = Arc::new(build_auth_chain(&config.authorizers));
    let state = AppState::new(registry, config.tool_loop.max_iterations, shutdown);
    router(state, auth, &expand_home(&config.server.static_dir))
}

/// Serve `app` on a pre-bound listener until `cancel` fires.
pub async fn serve(listener: TcpListener, app: Router, cancel: CancellationToken) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("Gateway listening on http://{addr}/v1");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    info!("Gateway shut down");
    Ok(())
}
