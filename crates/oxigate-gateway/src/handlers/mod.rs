//! Route handlers for the OpenAI-compatible surface.

pub mod chat;
pub mod embeddings;
pub mod media;
pub mod models;

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::Json;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::registry::Registry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    /// Completer rounds allowed per tool-calling request.
    pub max_iterations: usize,
    /// Root token; streamed requests derive their own child token from it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(registry: Arc<Registry>, max_iterations: usize, shutdown: CancellationToken) -> Self {
        Self {
            registry,
            max_iterations,
            shutdown,
        }
    }
}

/// Parse a JSON request body, turning failures into a 400.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "Rejected request body");
        ApiError::bad_request(format!("Invalid request body: {e}"))
    })
}

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
