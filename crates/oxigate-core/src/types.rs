//! Canonical types for Oxigate — the backend-agnostic data model.
//!
//! Every capability contract speaks these types. The wire adapter translates
//! them into a backend's own dialect, and the HTTP layer translates inbound
//! OpenAI-style requests into them.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Models
// ─────────────────────────────────────────────

/// A model known to the gateway. Identity is the `id`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Model {
    pub id: String,
    /// Unix timestamp of the first registration.
    pub created: i64,
}

impl Model {
    pub fn new(id: impl Into<String>) -> Self {
        Model {
            id: id.into(),
            created: chrono::Utc::now().timestamp(),
        }
    }
}

// ─────────────────────────────────────────────
// Roles
// ─────────────────────────────────────────────

/// Author of a conversation turn.
///
/// `Other` keeps a caller-supplied role the gateway does not know, so the
/// wire adapter can decide what to do with it instead of the parser.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
    Other(String),
}

impl Role {
    /// Parse a role as written by an inbound client.
    pub fn parse(role: &str) -> Self {
        match role {
            "system" => Role::System,
            "user" => Role::User,
            "assistant" => Role::Assistant,
            "tool" => Role::Tool,
            other => Role::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
            Role::Other(role) => role,
        }
    }
}

impl Serialize for Role {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Role::parse(&raw))
    }
}

// ─────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────

/// One conversation turn. Sequence order is conversation order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    /// Tool invocations requested by an assistant turn.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Set on `Role::Tool` turns: the call this result answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Message {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// An assistant turn that only requests tool calls.
    pub fn assistant_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Message {
            role: Role::Assistant,
            content: String::new(),
            tool_calls,
            tool_call_id: None,
        }
    }

    /// The result of a tool call, fed back to the calling model.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Message {
            role: Role::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// An incremental fragment of a streamed completion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Delta {
    /// Only present on the fragment that opens a turn.
    pub role: Option<Role>,
    pub content: String,
    pub finish_reason: Option<String>,
}

impl Delta {
    pub fn is_final(&self) -> bool {
        self.finish_reason.as_deref().is_some_and(|r| !r.is_empty())
    }
}

// ─────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────

/// A tool call requested by the model.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Unique ID for this call (used to match results).
    pub id: String,
    /// Always "function" in the OpenAI dialect.
    #[serde(rename = "type", default = "default_function_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        ToolCall {
            id: id.into(),
            call_type: default_function_type(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// The function name and arguments within a tool call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments string.
    #[serde(default)]
    pub arguments: String,
}

/// Definition of a tool, sent to the model so it knows what it may call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

/// Schema of a function tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        ToolDefinition {
            tool_type: default_function_type(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

fn default_function_type() -> String {
    "function".to_string()
}

// ─────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────

/// Optional generation parameters. `None` means "backend default".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompleteOptions {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stop: Vec<String>,
    /// Tools the model may call during this completion.
    pub tools: Vec<ToolDefinition>,
}

// ─────────────────────────────────────────────
// Media
// ─────────────────────────────────────────────

/// A rendered image, either hosted by the backend or inline.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Image {
    Url(String),
    B64Json(String),
}

/// Synthesized speech.
#[derive(Clone, Debug, PartialEq)]
pub struct Speech {
    /// MIME type reported by the backend (e.g. "audio/mpeg").
    pub content_type: String,
    pub audio: Vec<u8>,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
