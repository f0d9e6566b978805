use axum::extract::State;
use axum::Json;
use bytes::Bytes;
use futures_util::future::try_join_all;
use tracing::debug;

use super::{parse_body, AppState};
use crate::error::{ApiError, ApiResult};
use crate::wire::{EmbeddingList, EmbeddingsRequest};

/// `POST /v1/embeddings`: one vector per input string, in input order.
pub async fn embeddings(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<EmbeddingList>> {
    let request: EmbeddingsRequest = parse_body(&body)?;
    let embedder = state.registry.embedder(&request.model)?;

    let inputs = request.input.into_vec();
    if inputs.is_empty() {
        return Err(ApiError::bad_request("input must not be empty"));
    }
    debug!(model = %request.model, inputs = inputs.len(), "POST /v1/embeddings");

    let model = request.model;
    let vectors = try_join_all(inputs.iter().map(|text| embedder.embed(&model, text))).await?;

    Ok(Json(EmbeddingList::new(model, vectors)))
}
