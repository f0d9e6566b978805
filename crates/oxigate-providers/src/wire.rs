//! Backend wire format — request/response bodies of OpenAI-compatible APIs,
//! and the fixed role mapping between canonical and wire messages.

use serde::{Deserialize, Serialize};

use oxigate_core::types::{CompleteOptions, Delta, Message, Role, ToolCall, ToolDefinition};

// ─────────────────────────────────────────────
// Role mapping
// ─────────────────────────────────────────────

/// Canonical role → wire role. A role the gateway does not know becomes `""`.
pub fn to_wire_role(role: &Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
        Role::Other(_) => "",
    }
}

/// Wire role → canonical role. Anything unrecognised is treated as assistant.
pub fn from_wire_role(role: &str) -> Role {
    match role {
        "system" => Role::System,
        "user" => Role::User,
        "assistant" => Role::Assistant,
        "tool" => Role::Tool,
        _ => Role::Assistant,
    }
}

// ─────────────────────────────────────────────
// Chat completion request
// ─────────────────────────────────────────────

/// Request body for `POST /chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
}

impl ChatCompletionRequest {
    pub fn new(model: String, messages: &[Message], options: &CompleteOptions) -> Self {
        ChatCompletionRequest {
            model,
            messages: messages.iter().map(WireMessage::from).collect(),
            stream: false,
            temperature: options.temperature,
            top_p: options.top_p,
            max_tokens: options.max_tokens,
            stop: options.stop.clone(),
            tools: options.tools.clone(),
            tool_choice: (!options.tools.is_empty()).then(|| "auto".to_string()),
        }
    }
}

/// One message as the backend sees it.
#[derive(Debug, Serialize)]
pub struct WireMessage {
    pub role: &'static str,
    /// `null` for assistant turns that only carry tool calls.
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl From<&Message> for WireMessage {
    fn from(msg: &Message) -> Self {
        let content = if msg.content.is_empty() && msg.has_tool_calls() {
            None
        } else {
            Some(msg.content.clone())
        };

        WireMessage {
            role: to_wire_role(&msg.role),
            content,
            tool_calls: msg.tool_calls.clone(),
            tool_call_id: msg.tool_call_id.clone(),
        }
    }
}

// ─────────────────────────────────────────────
// Chat completion response
// ─────────────────────────────────────────────

/// Unary response of `POST /chat/completions`.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl From<ResponseMessage> for Message {
    fn from(msg: ResponseMessage) -> Self {
        Message {
            role: from_wire_role(msg.role.as_deref().unwrap_or_default()),
            content: msg.content.unwrap_or_default(),
            tool_calls: msg.tool_calls.unwrap_or_default(),
            tool_call_id: None,
        }
    }
}

/// One event of a streamed `POST /chat/completions`.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl From<ChunkChoice> for Delta {
    fn from(choice: ChunkChoice) -> Self {
        Delta {
            role: choice
                .delta
                .role
                .filter(|r| !r.is_empty())
                .map(|r| from_wire_role(&r)),
            content: choice.delta.content.unwrap_or_default(),
            finish_reason: choice.finish_reason.filter(|r| !r.is_empty()),
        }
    }
}

// ─────────────────────────────────────────────
// Other endpoints
// ─────────────────────────────────────────────

/// Response of `GET /models`.
#[derive(Debug, Deserialize)]
pub struct ModelListResponse {
    #[serde(default)]
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ModelEntry {
    pub id: String,
}

/// Request body for `POST /embeddings`.
#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub model: &'a str,
    pub input: &'a str,
}

/// Response of `POST /embeddings`.
#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    #[serde(default)]
    pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingData {
    pub embedding: Vec<f32>,
}

/// Request body for `POST /images/generations`.
#[derive(Debug, Serialize)]
pub struct ImageRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub n: u32,
}

/// Response of `POST /images/generations`.
#[derive(Debug, Deserialize)]
pub struct ImageResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub b64_json: Option<String>,
}

/// Request body for `POST /audio/speech`.
#[derive(Debug, Serialize)]
pub struct SpeechRequest<'a> {
    pub model: &'a str,
    pub input: &'a str,
    pub voice: &'a str,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
