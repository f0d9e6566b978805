//! Router tests: every route driven through `tower::ServiceExt::oneshot`
//! against in-process capability doubles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use oxigate_core::types::{CompleteOptions, Delta, Image, Message, Role, Speech, ToolCall};
use oxigate_core::{GatewayError, Result};
use oxigate_gateway::{router, AppState, AuthChain, Authorizer, Registry, StaticTokenAuthorizer};
use oxigate_providers::{Completer, Embedder, Renderer, Synthesizer, Transcriber};
use oxigate_tools::{Tool, ToolError, ToolHandle};

// ─────────────────────────────────────────────
// Doubles
// ─────────────────────────────────────────────

/// Streams scripted deltas; the unary call replays scripted replies.
struct ScriptedCompleter {
    deltas: Vec<Delta>,
    replies: Mutex<Vec<Message>>,
    fail_stream: bool,
}

impl ScriptedCompleter {
    fn streaming(deltas: Vec<Delta>) -> Self {
        Self {
            deltas,
            replies: Mutex::new(Vec::new()),
            fail_stream: false,
        }
    }

    fn replying(replies: Vec<Message>) -> Self {
        Self {
            deltas: Vec::new(),
            replies: Mutex::new(replies),
            fail_stream: false,
        }
    }
}

#[async_trait]
impl Completer for ScriptedCompleter {
    async fn complete(
        &self,
        _model: &str,
        _messages: &[Message],
        _options: &CompleteOptions,
    ) -> Result<Message> {
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            Ok(Message::assistant("default reply"))
        } else {
            Ok(replies.remove(0))
        }
    }

    async fn complete_stream(
        &self,
        _model: &str,
        _messages: &[Message],
        _options: &CompleteOptions,
        tx: mpsc::Sender<Delta>,
    ) -> Result<()> {
        for delta in &self.deltas {
            if tx.send(delta.clone()).await.is_err() {
                return Ok(());
            }
        }
        if self.fail_stream {
            return Err(GatewayError::Backend {
                status: 500,
                body: "upstream exploded".into(),
            });
        }
        Ok(())
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Sends one delta, then waits forever. Records when its call is dropped.
struct HangingCompleter {
    dropped: Arc<AtomicBool>,
}

#[async_trait]
impl Completer for HangingCompleter {
    async fn complete(
        &self,
        _model: &str,
        _messages: &[Message],
        _options: &CompleteOptions,
    ) -> Result<Message> {
        std::future::pending().await
    }

    async fn complete_stream(
        &self,
        _model: &str,
        _messages: &[Message],
        _options: &CompleteOptions,
        tx: mpsc::Sender<Delta>,
    ) -> Result<()> {
        let _flag = DropFlag(self.dropped.clone());
        let _ = tx.send(content("Hel")).await;
        std::future::pending::<()>().await;
        Ok(())
    }
}

struct LengthEmbedder;

#[async_trait]
impl Embedder for LengthEmbedder {
    async fn embed(&self, _model: &str, input: &str) -> Result<Vec<f32>> {
        Ok(vec![input.len() as f32, 1.0])
    }
}

struct UrlRenderer;

#[async_trait]
impl Renderer for UrlRenderer {
    async fn render(&self, _model: &str, prompt: &str) -> Result<Image> {
        Ok(Image::Url(format!("http://img.local/{}.png", prompt.replace(' ', "-"))))
    }
}

struct BeepSynthesizer;

#[async_trait]
impl Synthesizer for BeepSynthesizer {
    async fn synthesize(&self, _model: &str, _input: &str, _voice: Option<&str>) -> Result<Speech> {
        Ok(Speech {
            content_type: "audio/mpeg".into(),
            audio: vec![0xFF, 0xFB, 0x90],
        })
    }
}

struct EchoTranscriber;

#[async_trait]
impl Transcriber for EchoTranscriber {
    async fn transcribe(&self, _model: &str, audio: Vec<u8>, file_name: &str) -> Result<String> {
        Ok(format!("{file_name}:{}", audio.len()))
    }
}

struct ClockTool;

#[async_trait]
impl Tool for ClockTool {
    fn name(&self) -> &str {
        "clock"
    }
    fn description(&self) -> &str {
        "Current time"
    }
    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }
    async fn execute(&self, _params: &HashMap<String, Value>) -> std::result::Result<Value, ToolError> {
        Ok(json!("12:00"))
    }
}

// ─────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────

fn content(text: &str) -> Delta {
    Delta {
        role: None,
        content: text.to_string(),
        finish_reason: None,
    }
}

fn finish(reason: &str) -> Delta {
    Delta {
        role: None,
        content: String::new(),
        finish_reason: Some(reason.to_string()),
    }
}

fn build(registry: Registry, auth: AuthChain, shutdown: CancellationToken) -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("hello.txt"), "hello from files").unwrap();
    let state = AppState::new(Arc::new(registry), 10, shutdown);
    (router(state, Arc::new(auth), dir.path()), dir)
}

fn app_with(registry: Registry) -> (Router, tempfile::TempDir) {
    build(registry, AuthChain::open(), CancellationToken::new())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// The `data:` payloads of an SSE body, in order.
fn sse_data(raw: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(raw)
        .split("\n\n")
        .filter_map(|event| {
            event
                .lines()
                .find_map(|line| line.strip_prefix("data: ").or_else(|| line.strip_prefix("data:")))
                .map(str::to_string)
        })
        .collect()
}

fn chat_body(model: &str, stream: bool) -> Value {
    json!({
        "model": model,
        "stream": stream,
        "messages": [{"role": "user", "content": "hi"}]
    })
}

// ─────────────────────────────────────────────
// Basics
// ─────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let (app, _dir) = app_with(Registry::new());
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_list_models() {
    let mut registry = Registry::new();
    registry.register_embedder("bge-m3", Arc::new(LengthEmbedder));
    registry.register_completer("llama3", Arc::new(ScriptedCompleter::replying(vec![])));

    let (app, _dir) = app_with(registry);
    let body = body_json(app.oneshot(get("/v1/models")).await.unwrap()).await;

    assert_eq!(body["object"], "list");
    assert_eq!(body["data"][0]["id"], "bge-m3");
    assert_eq!(body["data"][1]["id"], "llama3");
    assert_eq!(body["data"][1]["object"], "model");
    assert!(body["data"][1]["created"].as_i64().unwrap() > 0);
}

// ─────────────────────────────────────────────
// Chat completions
// ─────────────────────────────────────────────

#[tokio::test]
async fn test_unary_chat() {
    let mut registry = Registry::new();
    registry.register_completer(
        "llama3",
        Arc::new(ScriptedCompleter::replying(vec![Message::assistant("Hello!")])),
    );

    let (app, _dir) = app_with(registry);
    let response = app.oneshot(post_json("/v1/chat/completions", chat_body("llama3", false))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["object"], "chat.completion");
    assert_eq!(body["model"], "llama3");
    assert!(body["id"].as_str().unwrap().starts_with("chatcmpl-"));
    assert_eq!(body["choices"][0]["message"]["content"], "Hello!");
    assert_eq!(body["choices"][0]["finish_reason"], "stop");
}

#[tokio::test]
async fn test_stream_ends_with_done() {
    let mut registry = Registry::new();
    registry.register_completer(
        "llama3",
        Arc::new(ScriptedCompleter::streaming(vec![content("Hel"), content("lo"), finish("stop")])),
    );

    let (app, _dir) = app_with(registry);
    let response = app.oneshot(post_json("/v1/chat/completions", chat_body("llama3", true))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let events = sse_data(&body_bytes(response).await);
    assert_eq!(events.len(), 4);
    assert_eq!(events.last().unwrap(), "[DONE]");

    let chunks: Vec<Value> = events[..3].iter().map(|e| serde_json::from_str(e).unwrap()).collect();
    assert_eq!(chunks[0]["object"], "chat.completion.chunk");
    assert_eq!(chunks[0]["choices"][0]["delta"]["role"], "assistant");
    assert_eq!(chunks[0]["choices"][0]["delta"]["content"], "Hel");
    assert_eq!(chunks[1]["choices"][0]["delta"]["content"], "lo");
    assert!(chunks[1]["choices"][0]["delta"].get("role").is_none());
    assert_eq!(chunks[2]["choices"][0]["finish_reason"], "stop");
    assert_eq!(chunks[0]["id"], chunks[2]["id"]);
}

#[tokio::test]
async fn test_stream_without_finish_gets_one() {
    let mut registry = Registry::new();
    registry.register_completer(
        "llama3",
        Arc::new(ScriptedCompleter::streaming(vec![content("partial")])),
    );

    let (app, _dir) = app_with(registry);
    let response = app.oneshot(post_json("/v1/chat/completions", chat_body("llama3", true))).await.unwrap();
    let events = sse_data(&body_bytes(response).await);

    assert_eq!(events.len(), 3);
    let last_chunk: Value = serde_json::from_str(&events[1]).unwrap();
    assert_eq!(last_chunk["choices"][0]["finish_reason"], "stop");
    assert_eq!(events[2], "[DONE]");
}

#[tokio::test]
async fn test_stream_backend_error_event() {
    let mut completer = ScriptedCompleter::streaming(vec![content("Hel")]);
    completer.fail_stream = true;
    let mut registry = Registry::new();
    registry.register_completer("llama3", Arc::new(completer));

    let (app, _dir) = app_with(registry);
    let response = app.oneshot(post_json("/v1/chat/completions", chat_body("llama3", true))).await.unwrap();
    let events = sse_data(&body_bytes(response).await);

    assert_eq!(events.len(), 3);
    let error: Value = serde_json::from_str(&events[1]).unwrap();
    assert_eq!(error["error"]["message"], "backend returned 500: upstream exploded");
    assert_eq!(events[2], "[DONE]");
}

#[tokio::test]
async fn test_client_disconnect_cancels_backend_call() {
    let dropped = Arc::new(AtomicBool::new(false));
    let mut registry = Registry::new();
    registry.register_completer(
        "llama3",
        Arc::new(HangingCompleter {
            dropped: dropped.clone(),
        }),
    );

    let (app, _dir) = app_with(registry);
    let response = app.oneshot(post_json("/v1/chat/completions", chat_body("llama3", true))).await.unwrap();

    let mut body = response.into_body();
    let frame = body.frame().await.unwrap().unwrap();
    let data = frame.into_data().unwrap();
    assert!(String::from_utf8_lossy(&data).contains("Hel"));
    assert!(!dropped.load(Ordering::SeqCst));

    drop(body);

    tokio::time::timeout(Duration::from_secs(2), async {
        while !dropped.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("backend call was not cancelled");
}

#[tokio::test]
async fn test_shutdown_closes_open_streams() {
    let dropped = Arc::new(AtomicBool::new(false));
    let mut registry = Registry::new();
    registry.register_completer(
        "llama3",
        Arc::new(HangingCompleter {
            dropped: dropped.clone(),
        }),
    );

    let shutdown = CancellationToken::new();
    let (app, _dir) = build(registry, AuthChain::open(), shutdown.clone());
    let response = app.oneshot(post_json("/v1/chat/completions", chat_body("llama3", true))).await.unwrap();

    let mut body = response.into_body();
    let _first = body.frame().await.unwrap().unwrap();
    shutdown.cancel();

    let rest = tokio::time::timeout(Duration::from_secs(2), body.collect())
        .await
        .expect("stream did not close")
        .unwrap()
        .to_bytes();
    let events = sse_data(&rest);
    assert_eq!(events.len(), 2);

    // A reply cut short by shutdown must not look like a normal stop.
    let error: Value = serde_json::from_str(&events[0]).unwrap();
    assert_eq!(error["error"]["type"], "server_error");
    assert_eq!(error["error"]["message"], "stream interrupted before completion");
    assert!(error.get("choices").is_none());
    assert!(!events.iter().any(|e| e.contains("\"finish_reason\":\"stop\"")));

    assert_eq!(events[1], "[DONE]");
    assert!(dropped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_unknown_model_is_404() {
    let (app, _dir) = app_with(Registry::new());
    let response = app.oneshot(post_json("/v1/chat/completions", chat_body("ghost", false))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "completer not found: ghost");
    assert_eq!(body["error"]["type"], "not_found_error");
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let (app, _dir) = app_with(Registry::new());
    let request = Request::builder()
        .method("POST")
        .uri("/v1/chat/completions")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["type"], "invalid_request_error");
}

// ─────────────────────────────────────────────
// Tool calling
// ─────────────────────────────────────────────

fn tool_registry() -> Registry {
    let mut registry = Registry::new();
    registry.register_completer(
        "gpt-4o",
        Arc::new(ScriptedCompleter::replying(vec![
            Message::assistant_tool_calls(vec![ToolCall::new("call_1", "time", "{}")]),
            Message::assistant("It is 12:00."),
        ])),
    );
    registry.register_tool("clock", "time", ToolHandle::Plain(Arc::new(ClockTool)));
    registry
}

fn tool_chat_body(stream: bool, tool: &str) -> Value {
    json!({
        "model": "gpt-4o",
        "stream": stream,
        "messages": [{"role": "user", "content": "what time is it?"}],
        "tools": [{"type": "function", "function": {"name": tool}}]
    })
}

#[tokio::test]
async fn test_tool_loop_unary() {
    let registry = tool_registry();
    let handle = registry.tool("time").unwrap();
    let (app, _dir) = app_with(registry);

    let response = app.oneshot(post_json("/v1/chat/completions", tool_chat_body(false, "time"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["choices"][0]["message"]["content"], "It is 12:00.");
    assert_eq!(handle.stats().unwrap().calls, 1);
}

#[tokio::test]
async fn test_tool_loop_streamed_reply() {
    let (app, _dir) = app_with(tool_registry());
    let response = app.oneshot(post_json("/v1/chat/completions", tool_chat_body(true, "time"))).await.unwrap();
    let events = sse_data(&body_bytes(response).await);

    assert_eq!(events.len(), 3);
    let first: Value = serde_json::from_str(&events[0]).unwrap();
    assert_eq!(first["choices"][0]["delta"]["content"], "It is 12:00.");
    assert_eq!(first["choices"][0]["delta"]["role"], Role::Assistant.as_str());
    let second: Value = serde_json::from_str(&events[1]).unwrap();
    assert_eq!(second["choices"][0]["finish_reason"], "stop");
    assert_eq!(events[2], "[DONE]");
}

#[tokio::test]
async fn test_unknown_tool_is_404() {
    let (app, _dir) = app_with(tool_registry());
    let response = app.oneshot(post_json("/v1/chat/completions", tool_chat_body(false, "weather"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["message"], "tool not found: weather");
}

// ─────────────────────────────────────────────
// Embeddings and media
// ─────────────────────────────────────────────

#[tokio::test]
async fn test_embeddings_batch() {
    let mut registry = Registry::new();
    registry.register_embedder("bge-m3", Arc::new(LengthEmbedder));
    let (app, _dir) = app_with(registry);

    let response = app
        .oneshot(post_json("/v1/embeddings", json!({"model": "bge-m3", "input": ["a", "hello"]})))
        .await
        .unwrap();
    let body = body_json(response).await;

    assert_eq!(body["object"], "list");
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"][0]["embedding"][0], 1.0);
    assert_eq!(body["data"][1]["embedding"][0], 5.0);
    assert_eq!(body["data"][1]["index"], 1);
}

#[tokio::test]
async fn test_embeddings_wrong_capability() {
    let mut registry = Registry::new();
    registry.register_completer("llama3", Arc::new(ScriptedCompleter::replying(vec![])));
    let (app, _dir) = app_with(registry);

    let response = app
        .oneshot(post_json("/v1/embeddings", json!({"model": "llama3", "input": "x"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_image_generation() {
    let mut registry = Registry::new();
    registry.register_renderer("dall-e-3", Arc::new(UrlRenderer));
    let (app, _dir) = app_with(registry);

    let response = app
        .oneshot(post_json("/v1/images/generations", json!({"model": "dall-e-3", "prompt": "red fox"})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["url"], "http://img.local/red-fox.png");
}

#[tokio::test]
async fn test_speech_returns_audio() {
    let mut registry = Registry::new();
    registry.register_synthesizer("tts-1", Arc::new(BeepSynthesizer));
    let (app, _dir) = app_with(registry);

    let response = app
        .oneshot(post_json("/v1/audio/speech", json!({"model": "tts-1", "input": "hi", "voice": "nova"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(body_bytes(response).await.as_ref(), &[0xFF, 0xFB, 0x90]);
}

#[tokio::test]
async fn test_transcription_multipart() {
    let mut registry = Registry::new();
    registry.register_transcriber("whisper-1", Arc::new(EchoTranscriber));
    let (app, _dir) = app_with(registry);

    let boundary = "oxigate-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"model\"\r\n\r\n\
         whisper-1\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"clip.wav\"\r\n\
         Content-Type: audio/wav\r\n\r\n\
         RIFF\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/v1/audio/transcriptions")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["text"], "clip.wav:4");
}

// ─────────────────────────────────────────────
// Auth and static files
// ─────────────────────────────────────────────

fn secured() -> (Router, tempfile::TempDir) {
    let auth = AuthChain::new(vec![Arc::new(StaticTokenAuthorizer::new("secret")) as Arc<dyn Authorizer>]);
    build(Registry::new(), auth, CancellationToken::new())
}

#[tokio::test]
async fn test_missing_token_is_401() {
    let (app, _dir) = secured();
    let response = app.oneshot(get("/v1/models")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
}

#[tokio::test]
async fn test_valid_token_passes() {
    let (app, _dir) = secured();
    let request = Request::builder()
        .uri("/v1/models")
        .header(header::AUTHORIZATION, "Bearer secret")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_files_bypass_auth() {
    let (app, _dir) = secured();
    let response = app.oneshot(get("/files/hello.txt")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await.as_ref(), b"hello from files");
}

#[tokio::test]
async fn test_health_bypasses_auth() {
    let (app, _dir) = secured();
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
