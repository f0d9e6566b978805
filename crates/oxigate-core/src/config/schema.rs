//! Configuration schema — the contract between the config file and the
//! registry factory.
//!
//! Hierarchy: `Config` → `ServerConfig`, `AuthorizerConfig`, `ProviderConfig`
//! (→ `ModelConfig`), `ToolConfig`, `ToolLoopConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.oxigate/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub server: ServerConfig,
    /// Request verifiers. Empty means every request is authorized.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authorizers: Vec<AuthorizerConfig>,
    /// Backend connections, each exposing one or more models.
    pub providers: Vec<ProviderConfig>,
    /// Tools keyed by the alias clients use to request them.
    pub tools: BTreeMap<String, ToolConfig>,
    pub tool_loop: ToolLoopConfig,
}

impl Config {
    /// A starter configuration pointing at a local Ollama.
    pub fn sample() -> Self {
        let mut models = BTreeMap::new();
        models.insert("llama3".to_string(), ModelConfig::default());
        models.insert(
            "nomic-embed-text".to_string(),
            ModelConfig {
                id: None,
                model_type: Some("embedder".to_string()),
            },
        );

        Config {
            providers: vec![ProviderConfig {
                provider_type: "ollama".to_string(),
                url: None,
                token: String::new(),
                models,
            }],
            ..Default::default()
        }
    }
}

// ─────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served read-only under `/files/`.
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            static_dir: "public".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ─────────────────────────────────────────────
// Authorizers
// ─────────────────────────────────────────────

/// One request verifier.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorizerConfig {
    /// Verifier kind. Currently only `"static"`.
    #[serde(rename = "type")]
    pub authorizer_type: String,
    /// Expected bearer token for `"static"`.
    pub token: String,
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// A backend connection (`openai`, `azure`, `ollama`, `llama`, `groq`, `mistral`).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    #[serde(rename = "type")]
    pub provider_type: String,
    /// Base URL. Falls back to the preset's default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Credential token sent to the backend.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub token: String,
    /// Public model id → model settings.
    pub models: BTreeMap<String, ModelConfig>,
}

/// A model exposed through a provider.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelConfig {
    /// Backend-internal model id. Defaults to the public id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Explicit capability (`completer`, `embedder`, …). Overrides inference.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
}

// ─────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────

/// A tool the gateway can execute on a model's behalf.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolConfig {
    /// Tool kind (`bing`, `searxng`, `tavily`, `draw`, `custom`).
    #[serde(rename = "type")]
    pub tool_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub token: String,
    /// Renderer model injected into `draw`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Name/description/schema for `custom` tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

/// Limits for the completer ↔ tool loop.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolLoopConfig {
    pub max_iterations: usize,
}

impl Default for ToolLoopConfig {
    fn default() -> Self {
        Self { max_iterations: 10 }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
