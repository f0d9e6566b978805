use axum::extract::State;
use axum::Json;
use tracing::debug;

use super::AppState;
use crate::wire::ModelList;

/// `GET /v1/models`: every registered model, sorted by id.
pub async fn list_models(State(state): State<AppState>) -> Json<ModelList> {
    let models = state.registry.models();
    debug!(count = models.len(), "GET /v1/models");
    Json(ModelList::from(models))
}
