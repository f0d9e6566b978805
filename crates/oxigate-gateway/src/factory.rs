//! Registry factory — turns configuration entries into registry bindings.
//!
//! Providers are bound before tools so a `draw` tool can resolve its renderer
//! from the registry. An entry that cannot be built is logged and skipped;
//! unrelated entries stay active.

use std::sync::Arc;

use tracing::{error, info, warn};

use oxigate_core::config::{AuthorizerConfig, Config, ProviderConfig, ToolConfig};
use oxigate_core::{GatewayError, Result};
use oxigate_providers::{create_provider, find_preset, resolve_model_type, HttpProvider, ModelType};
use oxigate_tools::tools::{
    BingTool, CustomTool, DrawTool, DuckDuckGoTool, SearxngTool, TavilyTool,
};
use oxigate_tools::ToolHandle;

use crate::auth::{AuthChain, Authorizer, DenyAllAuthorizer, StaticTokenAuthorizer};
use crate::registry::Registry;

/// Build the registry from every provider and tool entry in `config`.
pub fn build_registry(config: &Config) -> Registry {
    let mut registry = Registry::new();

    for (index, provider) in config.providers.iter().enumerate() {
        let entry = format!("providers[{index}]");
        if let Err(e) = register_provider(&mut registry, provider, &entry) {
            error!(entry = %entry, error = %e, "Skipping provider");
        }
    }

    for (alias, tool) in &config.tools {
        match create_tool(&registry, alias, tool) {
            Ok(handle) => registry.register_tool(&tool.tool_type.to_lowercase(), alias, handle),
            Err(e) => error!(tool = %alias, error = %e, "Skipping tool"),
        }
    }

    info!(
        models = registry.models().len(),
        tools = registry.tool_names().len(),
        "Registry ready"
    );
    registry
}

fn register_provider(registry: &mut Registry, config: &ProviderConfig, entry: &str) -> Result<()> {
    let provider = Arc::new(create_provider(config, entry)?);
    let preset = find_preset(&config.provider_type)
        .ok_or_else(|| GatewayError::config(entry, "unknown provider type"))?;

    for (id, model) in &config.models {
        let model_entry = format!("{entry}.models.{id}");
        let kind = match resolve_model_type(id, model.model_type.as_deref()) {
            Ok(kind) => kind,
            Err(reason) => {
                error!(entry = %model_entry, reason = %reason, "Skipping model");
                continue;
            }
        };

        if !preset.supports(kind) {
            warn!(
                entry = %model_entry,
                provider = preset.name,
                kind = %kind,
                "Provider does not support this model type, skipping"
            );
            continue;
        }

        bind_model(registry, id, kind, &provider);
    }

    Ok(())
}

fn bind_model(registry: &mut Registry, id: &str, kind: ModelType, provider: &Arc<HttpProvider>) {
    match kind {
        ModelType::Completer | ModelType::Auto => registry.register_completer(id, provider.clone()),
        ModelType::Embedder => registry.register_embedder(id, provider.clone()),
        ModelType::Renderer => registry.register_renderer(id, provider.clone()),
        ModelType::Synthesizer => registry.register_synthesizer(id, provider.clone()),
        ModelType::Transcriber => registry.register_transcriber(id, provider.clone()),
    }
}

fn required<'a>(value: Option<&'a str>, alias: &str, field: &str) -> Result<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(GatewayError::config(
            format!("tools.{alias}"),
            format!("missing required field '{field}'"),
        )),
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// Build one tool from its config entry.
pub fn create_tool(registry: &Registry, alias: &str, config: &ToolConfig) -> Result<ToolHandle> {
    let handle = match config.tool_type.to_lowercase().as_str() {
        "bing" => {
            let token = required(non_empty(&config.token), alias, "token")?;
            let mut tool = BingTool::new(token);
            if let Some(url) = config.url.as_deref() {
                tool = tool.with_endpoint(url);
            }
            ToolHandle::Plain(Arc::new(tool))
        }
        "duckduckgo" => {
            let mut tool = DuckDuckGoTool::new();
            if let Some(url) = config.url.as_deref() {
                tool = tool.with_endpoint(url);
            }
            ToolHandle::Plain(Arc::new(tool))
        }
        "searxng" => {
            let url = required(config.url.as_deref(), alias, "url")?;
            ToolHandle::Plain(Arc::new(SearxngTool::new(url)))
        }
        "tavily" => {
            let token = required(non_empty(&config.token), alias, "token")?;
            let mut tool = TavilyTool::new(token);
            if let Some(url) = config.url.as_deref() {
                tool = tool.with_endpoint(url);
            }
            ToolHandle::Plain(Arc::new(tool))
        }
        "draw" => {
            let model = required(config.model.as_deref(), alias, "model")?;
            let mut tool = DrawTool::new(model);
            match registry.renderer(model) {
                Ok(renderer) => tool = tool.with_renderer(renderer),
                Err(_) => warn!(
                    tool = %alias,
                    model = model,
                    "No renderer bound for draw tool, calls will fail"
                ),
            }
            ToolHandle::Plain(Arc::new(tool))
        }
        "custom" => {
            let url = required(config.url.as_deref(), alias, "url")?;
            let mut tool = CustomTool::new(url)
                .with_token(&config.token)
                .with_name(config.name.as_deref().unwrap_or(alias));
            if let Some(description) = config.description.as_deref() {
                tool = tool.with_description(description);
            }
            if let Some(parameters) = config.parameters.clone() {
                tool = tool.with_parameters(parameters);
            }
            ToolHandle::Plain(Arc::new(tool))
        }
        other => {
            return Err(GatewayError::config(
                format!("tools.{alias}"),
                format!("invalid tool type: {other}"),
            ))
        }
    };
    Ok(handle)
}

/// Build the auth chain from the authorizer entries. Unknown kinds are
/// logged and skipped; if every entry is skipped the chain denies all
/// requests instead of falling open.
pub fn build_auth_chain(configs: &[AuthorizerConfig]) -> AuthChain {
    let mut authorizers: Vec<Arc<dyn Authorizer>> = Vec::new();

    for (index, config) in configs.iter().enumerate() {
        match config.authorizer_type.to_lowercase().as_str() {
            "static" if !config.token.is_empty() => {
                authorizers.push(Arc::new(StaticTokenAuthorizer::new(&config.token)));
            }
            "static" => error!(entry = index, "Static authorizer without token, skipping"),
            other => error!(entry = index, kind = other, "Unknown authorizer type, skipping"),
        }
    }

    if authorizers.is_empty() && !configs.is_empty() {
        error!(
            entries = configs.len(),
            "No valid authorizer configured, rejecting every request"
        );
        authorizers.push(Arc::new(DenyAllAuthorizer));
    }

    info!(authorizers = authorizers.len(), "Auth chain ready");
    AuthChain::new(authorizers)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
