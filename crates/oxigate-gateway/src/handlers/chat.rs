//! `POST /v1/chat/completions` — unary, streamed, and tool-calling completions.
//!
//! Streaming runs the backend call in a producer task that feeds a bounded
//! channel; the SSE body drains it in order. The body owns a drop guard of the
//! request's cancellation token, so a client disconnect cancels the producer
//! and with it the backend request.

use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use futures_util::stream;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use oxigate_core::types::{CompleteOptions, Delta, Message};
use oxigate_core::GatewayError;
use oxigate_providers::Completer;
use oxigate_tools::ToolLoop;

use super::{parse_body, AppState};
use crate::error::{ApiError, ApiResult};
use crate::wire::{ChatRequest, ChunkDelta, ErrorResponse, ResponseMeta};

/// Deltas buffered between the producer task and the SSE body.
pub const STREAM_BUFFER: usize = 32;

/// Error message sent when a stream is cut off before the backend finished.
pub const STREAM_INTERRUPTED: &str = "stream interrupted before completion";

const DONE_MARKER: &str = "[DONE]";

type SseItem = std::result::Result<Event, axum::Error>;

pub async fn chat_completions(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let request: ChatRequest = parse_body(&body)?;
    let streaming = request.stream;
    let (model, messages, options, tool_names) = request.into_parts();

    let completer = state.registry.completer(&model)?;
    info!(
        model = %model,
        stream = streaming,
        messages = messages.len(),
        tools = tool_names.len(),
        "POST /v1/chat/completions"
    );
    let meta = ResponseMeta::new(&model);

    if !tool_names.is_empty() {
        let tools = state.registry.tool_set(tool_names.iter().map(String::as_str))?;
        let reply = ToolLoop::new(completer, tools)
            .with_max_iterations(state.max_iterations)
            .run(&model, messages, &options)
            .await?;
        return Ok(if streaming {
            replay_stream(meta, reply)
        } else {
            Json(meta.completion(reply)).into_response()
        });
    }

    if !streaming {
        let reply = completer.complete(&model, &messages, &options).await?;
        return Ok(Json(meta.completion(reply)).into_response());
    }

    Ok(stream_completion(
        state.shutdown.child_token(),
        completer,
        meta,
        messages,
        options,
    ))
}

// ─────────────────────────────────────────────
// Tool-loop replies
// ─────────────────────────────────────────────

/// Emit an already complete reply as one content delta, the finish event and
/// the terminator.
fn replay_stream(meta: ResponseMeta, reply: Message) -> Response {
    let delta = ChunkDelta {
        role: Some(reply.role.as_str().to_string()),
        content: Some(reply.content),
    };
    let events: Vec<SseItem> = vec![
        Event::default().json_data(meta.chunk(delta, None)),
        Event::default().json_data(meta.chunk(ChunkDelta::default(), Some("stop".to_string()))),
        Ok(Event::default().data(DONE_MARKER)),
    ];
    Sse::new(stream::iter(events)).into_response()
}

// ─────────────────────────────────────────────
// Live streaming
// ─────────────────────────────────────────────

fn stream_completion(
    token: CancellationToken,
    completer: Arc<dyn Completer>,
    meta: ResponseMeta,
    messages: Vec<Message>,
    options: CompleteOptions,
) -> Response {
    let (tx, rx) = mpsc::channel::<Delta>(STREAM_BUFFER);
    let (done_tx, done_rx) = oneshot::channel::<Outcome>();

    let producer_token = token.clone();
    let model = meta.model.clone();
    tokio::spawn(async move {
        let outcome = tokio::select! {
            _ = producer_token.cancelled() => {
                debug!(model = %model, "Stream cancelled");
                Outcome::Interrupted
            }
            result = completer.complete_stream(&model, &messages, &options, tx) => match result {
                Ok(()) => Outcome::Completed,
                Err(e) => Outcome::Failed(e),
            },
        };
        // The receiver is gone once the client has disconnected.
        let _ = done_tx.send(outcome);
    });

    let body = DeltaStream {
        rx,
        done: Some(done_rx),
        meta,
        phase: Phase::Deltas,
        opened: false,
        finished: false,
        _guard: token.drop_guard(),
    };

    Sse::new(stream::unfold(body, next_event))
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// How the producer task stopped.
enum Outcome {
    /// The backend stream ended on its own.
    Completed,
    /// The request token fired before the backend finished.
    Interrupted,
    Failed(GatewayError),
}

enum Phase {
    Deltas,
    Done,
    Closed,
}

struct DeltaStream {
    rx: mpsc::Receiver<Delta>,
    done: Option<oneshot::Receiver<Outcome>>,
    meta: ResponseMeta,
    phase: Phase,
    /// Whether the opening chunk (carrying the role) has been sent.
    opened: bool,
    /// Whether a delta with a finish reason has been sent.
    finished: bool,
    _guard: DropGuard,
}

impl DeltaStream {
    fn delta_event(&mut self, delta: Delta) -> SseItem {
        let finish_reason = delta.finish_reason.clone().filter(|r| !r.is_empty());
        self.finished |= finish_reason.is_some();

        let mut chunk = ChunkDelta::from(delta);
        if !self.opened {
            self.opened = true;
            chunk.role.get_or_insert_with(|| "assistant".to_string());
        }
        Event::default().json_data(self.meta.chunk(chunk, finish_reason))
    }

    /// Event sent once the producer has stopped: an error if the backend
    /// failed or the stream was cut short, a finish chunk if a completed
    /// backend stream never sent one, or the terminator.
    async fn closing_event(&mut self) -> SseItem {
        let outcome = match self.done.take() {
            // A producer that vanished without reporting did not complete.
            Some(done) => done.await.unwrap_or(Outcome::Interrupted),
            None => Outcome::Completed,
        };

        match outcome {
            Outcome::Failed(e) => {
                let err = ApiError::from(e);
                warn!(model = %self.meta.model, error = %err, "Stream failed");
                self.phase = Phase::Done;
                Event::default().json_data(ErrorResponse::new(err.to_string(), err.error_type()))
            }
            Outcome::Interrupted => {
                info!(model = %self.meta.model, "Stream interrupted before completion");
                self.phase = Phase::Done;
                Event::default().json_data(ErrorResponse::new(STREAM_INTERRUPTED, "server_error"))
            }
            Outcome::Completed if !self.finished => {
                self.phase = Phase::Done;
                Event::default().json_data(self.meta.chunk(ChunkDelta::default(), Some("stop".to_string())))
            }
            Outcome::Completed => {
                self.phase = Phase::Closed;
                Ok(Event::default().data(DONE_MARKER))
            }
        }
    }
}

async fn next_event(mut body: DeltaStream) -> Option<(SseItem, DeltaStream)> {
    let event = match body.phase {
        Phase::Deltas => match body.rx.recv().await {
            Some(delta) => body.delta_event(delta),
            None => body.closing_event().await,
        },
        Phase::Done => {
            body.phase = Phase::Closed;
            Ok(Event::default().data(DONE_MARKER))
        }
        Phase::Closed => return None,
    };
    Some((event, body))
}
