//! Image, speech and transcription routes.

use axum::extract::{Multipart, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use tracing::debug;

use super::{parse_body, AppState};
use crate::error::{ApiError, ApiResult};
use crate::wire::{ImageList, ImageObject, ImagesRequest, SpeechRequest, Transcription};

/// Largest upload accepted by `/v1/audio/transcriptions`.
pub const MAX_AUDIO_UPLOAD: usize = 25 * 1024 * 1024;

/// `POST /v1/images/generations`
pub async fn generate_image(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<ImageList>> {
    let request: ImagesRequest = parse_body(&body)?;
    let renderer = state.registry.renderer(&request.model)?;
    debug!(model = %request.model, "POST /v1/images/generations");

    let image = renderer.render(&request.model, &request.prompt).await?;
    Ok(Json(ImageList {
        created: chrono::Utc::now().timestamp(),
        data: vec![ImageObject::from(image)],
    }))
}

/// `POST /v1/audio/speech`: returns the raw audio with the backend's MIME type.
pub async fn synthesize_speech(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let request: SpeechRequest = parse_body(&body)?;
    let synthesizer = state.registry.synthesizer(&request.model)?;
    debug!(model = %request.model, chars = request.input.len(), "POST /v1/audio/speech");

    let speech = synthesizer
        .synthesize(&request.model, &request.input, request.voice.as_deref())
        .await?;

    let content_type = HeaderValue::from_str(&speech.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    Ok(([(header::CONTENT_TYPE, content_type)], speech.audio).into_response())
}

/// `POST /v1/audio/transcriptions`: multipart `file` and `model` fields.
pub async fn transcribe_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<Transcription>> {
    let mut model = None;
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("model") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid model field: {e}")))?;
                model = Some(text);
            }
            Some("file") => {
                let name = field.file_name().unwrap_or("audio").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid file field: {e}")))?;
                file = Some((name, data));
            }
            _ => {}
        }
    }

    let model = model.ok_or_else(|| ApiError::bad_request("missing 'model' field"))?;
    let (file_name, data) = file.ok_or_else(|| ApiError::bad_request("missing 'file' field"))?;

    let transcriber = state.registry.transcriber(&model)?;
    debug!(model = %model, file = %file_name, bytes = data.len(), "POST /v1/audio/transcriptions");

    let text = transcriber.transcribe(&model, data.to_vec(), &file_name).await?;
    Ok(Json(Transcription { text }))
}
