//! Error taxonomy shared by every Oxigate crate.
//!
//! Errors carry their kind and the identifier they concern. Mapping them to
//! HTTP status codes is left to the gateway crate.

use std::fmt;

/// The capability a lookup was made for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    Model,
    Completer,
    Embedder,
    Renderer,
    Synthesizer,
    Transcriber,
    Tool,
}

impl CapabilityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityKind::Model => "model",
            CapabilityKind::Completer => "completer",
            CapabilityKind::Embedder => "embedder",
            CapabilityKind::Renderer => "renderer",
            CapabilityKind::Synthesizer => "synthesizer",
            CapabilityKind::Transcriber => "transcriber",
            CapabilityKind::Tool => "tool",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while resolving and calling backends.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A configuration entry could not be turned into a binding.
    #[error("invalid configuration for '{entry}': {reason}")]
    Config { entry: String, reason: String },

    /// No binding exists for the requested identifier.
    #[error("{kind} not found: {id}")]
    NotFound { kind: CapabilityKind, id: String },

    /// The model mapper has no backend id for this model.
    #[error("invalid model mapping: {model}")]
    InvalidModelMapping { model: String },

    /// The request never produced an HTTP response.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    /// The backend answered with a payload we could not read.
    #[error("failed to decode backend response: {0}")]
    Decode(String),

    /// The backend answered successfully but without the expected item.
    #[error("backend returned no {0}")]
    EmptyResponse(&'static str),

    /// The tool-calling loop hit its iteration limit.
    #[error("tool loop exceeded {iterations} iterations")]
    ToolLoopExhausted { iterations: usize },
}

impl GatewayError {
    pub fn not_found(kind: CapabilityKind, id: impl Into<String>) -> Self {
        GatewayError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn config(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        GatewayError::Config {
            entry: entry.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_contains_id() {
        let err = GatewayError::not_found(CapabilityKind::Embedder, "text-embedding-3-small");
        assert_eq!(err.to_string(), "embedder not found: text-embedding-3-small");
    }

    #[test]
    fn test_config_message() {
        let err = GatewayError::config("tools.search", "invalid tool type: altavista");
        assert!(err.to_string().contains("tools.search"));
        assert!(err.to_string().contains("altavista"));
    }

    #[test]
    fn test_backend_message() {
        let err = GatewayError::Backend {
            status: 429,
            body: "slow down".into(),
        };
        assert_eq!(err.to_string(), "backend returned 429: slow down");
    }
}
