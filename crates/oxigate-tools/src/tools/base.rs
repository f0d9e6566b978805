//! Tool trait — the interface every gateway tool implements.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use oxigate_core::types::ToolDefinition;
use oxigate_core::GatewayError;

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

/// Failure of a single tool invocation.
///
/// Recoverable at the conversation level: the tool set turns it into a
/// result string the calling model can read.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("tool unavailable: {0}")]
    Unavailable(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("endpoint returned {status}: {body}")]
    Backend { status: u16, body: String },

    #[error(transparent)]
    Provider(#[from] GatewayError),
}

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every tool implements this trait.
///
/// The tool loop sends schemas to the model via `to_definition()` and
/// dispatches the model's calls via `execute()`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool kind, e.g. `"bing"`. Used for instrumentation.
    fn name(&self) -> &str;

    /// Description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema of the parameters:
    /// `{"type": "object", "properties": {...}, "required": [...]}`.
    fn parameters(&self) -> Value;

    /// Run the tool. The result is serialized back to the model.
    async fn execute(&self, params: &HashMap<String, Value>) -> Result<Value, ToolError>;

    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters())
    }
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Extract a required, non-empty `String` param.
pub fn require_string(params: &HashMap<String, Value>, key: &str) -> Result<String, ToolError> {
    match params.get(key) {
        None | Some(Value::Null) => Err(ToolError::MissingParameter(key.to_string())),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(ToolError::MissingParameter(key.to_string()))
        }
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ToolError::InvalidParameter {
            name: key.to_string(),
            reason: "expected a string".to_string(),
        }),
    }
}
