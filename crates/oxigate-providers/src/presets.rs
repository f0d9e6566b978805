//! Deployment presets — the vendor variants the wire adapter is configured as.
//!
//! Every supported backend speaks the same OpenAI-compatible protocol; they
//! differ only in default base URL, URL normalisation, and which capabilities
//! are offered. Adding a backend means adding one row here.

use oxigate_core::{GatewayError, Result};

use crate::model_type::ModelType;

/// How a configured base URL is turned into the API root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UrlStyle {
    /// Use the URL as configured (trailing `/` trimmed).
    AsGiven,
    /// Servers that expose the API under `/v1` whatever the user typed:
    /// trim `/`, strip a trailing `/v1`, append `/v1`.
    ForceV1,
}

/// Static description of one backend variant.
#[derive(Debug)]
pub struct Preset {
    /// Config name (`type` field of a provider entry).
    pub name: &'static str,
    /// Human-readable name for logs.
    pub display_name: &'static str,
    /// Base URL when the config has none. `None` = a URL is required.
    pub default_url: Option<&'static str>,
    pub url_style: UrlStyle,
    pub capabilities: &'static [ModelType],
}

const ALL: &[ModelType] = &[
    ModelType::Completer,
    ModelType::Embedder,
    ModelType::Renderer,
    ModelType::Synthesizer,
    ModelType::Transcriber,
];

/// All supported backends.
pub static PRESETS: &[Preset] = &[
    Preset {
        name: "openai",
        display_name: "OpenAI",
        default_url: Some("https://api.openai.com/v1"),
        url_style: UrlStyle::AsGiven,
        capabilities: ALL,
    },
    Preset {
        name: "azure",
        display_name: "Azure OpenAI",
        default_url: None,
        url_style: UrlStyle::AsGiven,
        capabilities: ALL,
    },
    Preset {
        name: "ollama",
        display_name: "Ollama",
        default_url: Some("http://localhost:11434"),
        url_style: UrlStyle::ForceV1,
        capabilities: &[ModelType::Completer, ModelType::Embedder],
    },
    Preset {
        name: "llama",
        display_name: "llama.cpp",
        default_url: None,
        url_style: UrlStyle::ForceV1,
        capabilities: &[ModelType::Completer, ModelType::Embedder],
    },
    Preset {
        name: "groq",
        display_name: "Groq",
        default_url: Some("https://api.groq.com/openai/v1"),
        url_style: UrlStyle::AsGiven,
        capabilities: &[ModelType::Completer, ModelType::Transcriber],
    },
    Preset {
        name: "mistral",
        display_name: "Mistral",
        default_url: Some("https://api.mistral.ai/v1"),
        url_style: UrlStyle::AsGiven,
        capabilities: &[ModelType::Completer, ModelType::Embedder],
    },
];

/// Find a preset by config name (case-insensitive).
pub fn find_preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

impl Preset {
    /// Resolve the API root from the configured URL (or the default).
    pub fn resolve_url(&self, configured: Option<&str>) -> Result<String> {
        let raw = configured
            .filter(|u| !u.trim().is_empty())
            .or(self.default_url)
            .ok_or_else(|| GatewayError::config(self.name, "a base url is required"))?;

        let trimmed = raw.trim().trim_end_matches('/');
        Ok(match self.url_style {
            UrlStyle::AsGiven => trimmed.to_string(),
            UrlStyle::ForceV1 => {
                let root = trimmed.strip_suffix("/v1").unwrap_or(trimmed);
                format!("{}/v1", root.trim_end_matches('/'))
            }
        })
    }

    /// Whether models of this type can be bound on this backend.
    /// `Auto` counts as a completer.
    pub fn supports(&self, kind: ModelType) -> bool {
        let kind = match kind {
            ModelType::Auto => ModelType::Completer,
            other => other,
        };
        self.capabilities.contains(&kind)
    }
}
