//! Client wire format — the OpenAI-style bodies the gateway accepts and
//! returns, and their conversion to and from the canonical types.

use serde::{Deserialize, Serialize};

use oxigate_core::types::{CompleteOptions, Delta, Image, Message, Model, Role, ToolCall};

/// Owner reported for every model in `/v1/models`.
pub const MODEL_OWNER: &str = "oxigate";

// ─────────────────────────────────────────────
// Chat completions: request
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<InboundMessage>,
    #[serde(default)]
    pub stream: bool,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stop: Option<StopSequences>,
    /// Gateway tools the model may call, referenced by name.
    #[serde(default)]
    pub tools: Vec<RequestedTool>,
}

#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<MessageContent>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default)]
    pub tool_call_id: Option<String>,
}

/// Plain text, or the array-of-parts form. Only text parts are kept.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub part_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl MessageContent {
    pub fn into_text(self) -> String {
        match self {
            MessageContent::Text(text) => text,
            MessageContent::Parts(parts) => parts
                .into_iter()
                .filter(|p| p.part_type == "text")
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StopSequences {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
pub struct RequestedTool {
    #[serde(rename = "type", default)]
    pub tool_type: String,
    pub function: RequestedFunction,
}

#[derive(Debug, Deserialize)]
pub struct RequestedFunction {
    pub name: String,
}

impl From<InboundMessage> for Message {
    fn from(m: InboundMessage) -> Self {
        Message {
            role: Role::parse(&m.role),
            content: m.content.map(MessageContent::into_text).unwrap_or_default(),
            tool_calls: m.tool_calls,
            tool_call_id: m.tool_call_id,
        }
    }
}

impl ChatRequest {
    /// Split into the canonical conversation and options. Tools are resolved
    /// separately through the registry.
    pub fn into_parts(self) -> (String, Vec<Message>, CompleteOptions, Vec<String>) {
        let options = CompleteOptions {
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
            stop: match self.stop {
                None => Vec::new(),
                Some(StopSequences::One(s)) => vec![s],
                Some(StopSequences::Many(v)) => v,
            },
            tools: Vec::new(),
        };
        let tools = self.tools.into_iter().map(|t| t.function.name).collect();
        let messages = self.messages.into_iter().map(Message::from).collect();
        (self.model, messages, options, tools)
    }
}

// ─────────────────────────────────────────────
// Chat completions: response
// ─────────────────────────────────────────────

/// Identity shared by every object of one completion response.
#[derive(Clone, Debug)]
pub struct ResponseMeta {
    pub id: String,
    pub created: i64,
    pub model: String,
}

impl ResponseMeta {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            id: format!("chatcmpl-{}", uuid::Uuid::new_v4()),
            created: chrono::Utc::now().timestamp(),
            model: model.into(),
        }
    }

    pub fn completion(&self, message: Message) -> ChatCompletion {
        let finish_reason = if message.has_tool_calls() {
            "tool_calls"
        } else {
            "stop"
        };
        ChatCompletion {
            id: self.id.clone(),
            object: "chat.completion",
            created: self.created,
            model: self.model.clone(),
            choices: vec![CompletionChoice {
                index: 0,
                message: OutboundMessage::from(message),
                finish_reason: finish_reason.to_string(),
            }],
        }
    }

    pub fn chunk(&self, delta: ChunkDelta, finish_reason: Option<String>) -> ChatCompletionChunk {
        ChatCompletionChunk {
            id: self.id.clone(),
            object: "chat.completion.chunk",
            created: self.created,
            model: self.model.clone(),
            choices: vec![ChunkChoice {
                index: 0,
                delta,
                finish_reason,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatCompletion {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub model: String,
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Serialize)]
pub struct CompletionChoice {
    pub index: u32,
    pub message: OutboundMessage,
    pub finish_reason: String,
}

#[derive(Debug, Serialize)]
pub struct OutboundMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl From<Message> for OutboundMessage {
    fn from(m: Message) -> Self {
        OutboundMessage {
            role: m.role.as_str().to_string(),
            content: m.content,
            tool_calls: m.tool_calls,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Serialize)]
pub struct ChunkChoice {
    pub index: u32,
    pub delta: ChunkDelta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct ChunkDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ChunkDelta {
    pub fn content(text: impl Into<String>) -> Self {
        ChunkDelta {
            role: None,
            content: Some(text.into()),
        }
    }
}

impl From<Delta> for ChunkDelta {
    fn from(d: Delta) -> Self {
        ChunkDelta {
            role: d.role.map(|r| r.as_str().to_string()),
            content: (!d.content.is_empty()).then_some(d.content),
        }
    }
}

// ─────────────────────────────────────────────
// Models
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ModelList {
    pub object: &'static str,
    pub data: Vec<ModelObject>,
}

#[derive(Debug, Serialize)]
pub struct ModelObject {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub owned_by: &'static str,
}

impl From<Vec<Model>> for ModelList {
    fn from(models: Vec<Model>) -> Self {
        ModelList {
            object: "list",
            data: models
                .into_iter()
                .map(|m| ModelObject {
                    id: m.id,
                    object: "model",
                    created: m.created,
                    owned_by: MODEL_OWNER,
                })
                .collect(),
        }
    }
}

// ─────────────────────────────────────────────
// Embeddings
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EmbeddingsRequest {
    pub model: String,
    pub input: EmbeddingInput,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    One(String),
    Many(Vec<String>),
}

impl EmbeddingInput {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            EmbeddingInput::One(s) => vec![s],
            EmbeddingInput::Many(v) => v,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmbeddingList {
    pub object: &'static str,
    pub model: String,
    pub data: Vec<EmbeddingObject>,
}

#[derive(Debug, Serialize)]
pub struct EmbeddingObject {
    pub object: &'static str,
    pub index: usize,
    pub embedding: Vec<f32>,
}

impl EmbeddingList {
    pub fn new(model: String, vectors: Vec<Vec<f32>>) -> Self {
        EmbeddingList {
            object: "list",
            model,
            data: vectors
                .into_iter()
                .enumerate()
                .map(|(index, embedding)| EmbeddingObject {
                    object: "embedding",
                    index,
                    embedding,
                })
                .collect(),
        }
    }
}

// ─────────────────────────────────────────────
// Images and audio
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ImagesRequest {
    pub model: String,
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ImageList {
    pub created: i64,
    pub data: Vec<ImageObject>,
}

#[derive(Debug, Default, Serialize)]
pub struct ImageObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b64_json: Option<String>,
}

impl From<Image> for ImageObject {
    fn from(image: Image) -> Self {
        match image {
            Image::Url(url) => ImageObject {
                url: Some(url),
                ..Default::default()
            },
            Image::B64Json(data) => ImageObject {
                b64_json: Some(data),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    pub model: String,
    pub input: String,
    #[serde(default)]
    pub voice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Transcription {
    pub text: String,
}

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, error_type: impl Into<String>) -> Self {
        ErrorResponse {
            error: ErrorBody {
                message: message.into(),
                error_type: error_type.into(),
            },
        }
    }
}
