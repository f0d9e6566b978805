//! Provider registry — binds model ids and tool aliases to implementations.
//!
//! Built once at startup through the `register_*` methods, then frozen behind
//! an `Arc<Registry>` and shared read-only by every request task.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use oxigate_core::types::Model;
use oxigate_core::{CapabilityKind, GatewayError, Result};
use oxigate_providers::{Completer, Embedder, Renderer, Synthesizer, Transcriber};
use oxigate_tools::{ToolHandle, ToolSet};

#[derive(Default)]
pub struct Registry {
    models: HashMap<String, Model>,
    completers: HashMap<String, Arc<dyn Completer>>,
    embedders: HashMap<String, Arc<dyn Embedder>>,
    renderers: HashMap<String, Arc<dyn Renderer>>,
    synthesizers: HashMap<String, Arc<dyn Synthesizer>>,
    transcribers: HashMap<String, Arc<dyn Transcriber>>,
    tools: HashMap<String, ToolHandle>,
}

/// Look up `id` in one binding table.
fn lookup<T: ?Sized>(
    table: &HashMap<String, Arc<T>>,
    kind: CapabilityKind,
    id: &str,
) -> Result<Arc<T>> {
    table
        .get(id)
        .cloned()
        .ok_or_else(|| GatewayError::not_found(kind, id))
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Registration ──

    /// Register a model id. A second registration of the same id is a no-op.
    pub fn register_model(&mut self, id: &str) {
        if self.models.contains_key(id) {
            return;
        }
        debug!(model = id, "registered model");
        self.models.insert(id.to_string(), Model::new(id));
    }

    pub fn register_completer(&mut self, id: &str, completer: Arc<dyn Completer>) {
        self.register_model(id);
        info!(model = id, kind = "completer", "bound model");
        self.completers.insert(id.to_string(), completer);
    }

    pub fn register_embedder(&mut self, id: &str, embedder: Arc<dyn Embedder>) {
        self.register_model(id);
        info!(model = id, kind = "embedder", "bound model");
        self.embedders.insert(id.to_string(), embedder);
    }

    pub fn register_renderer(&mut self, id: &str, renderer: Arc<dyn Renderer>) {
        self.register_model(id);
        info!(model = id, kind = "renderer", "bound model");
        self.renderers.insert(id.to_string(), renderer);
    }

    pub fn register_synthesizer(&mut self, id: &str, synthesizer: Arc<dyn Synthesizer>) {
        self.register_model(id);
        info!(model = id, kind = "synthesizer", "bound model");
        self.synthesizers.insert(id.to_string(), synthesizer);
    }

    pub fn register_transcriber(&mut self, id: &str, transcriber: Arc<dyn Transcriber>) {
        self.register_model(id);
        info!(model = id, kind = "transcriber", "bound model");
        self.transcribers.insert(id.to_string(), transcriber);
    }

    /// Register a tool under `alias`, instrumented as `name` unless it
    /// already is.
    pub fn register_tool(&mut self, name: &str, alias: &str, tool: ToolHandle) {
        info!(tool = name, alias = alias, "registered tool");
        self.tools.insert(alias.to_string(), tool.instrument(name));
    }

    // ── Lookup ──

    pub fn completer(&self, id: &str) -> Result<Arc<dyn Completer>> {
        lookup(&self.completers, CapabilityKind::Completer, id)
    }

    pub fn embedder(&self, id: &str) -> Result<Arc<dyn Embedder>> {
        lookup(&self.embedders, CapabilityKind::Embedder, id)
    }

    pub fn renderer(&self, id: &str) -> Result<Arc<dyn Renderer>> {
        lookup(&self.renderers, CapabilityKind::Renderer, id)
    }

    pub fn synthesizer(&self, id: &str) -> Result<Arc<dyn Synthesizer>> {
        lookup(&self.synthesizers, CapabilityKind::Synthesizer, id)
    }

    pub fn transcriber(&self, id: &str) -> Result<Arc<dyn Transcriber>> {
        lookup(&self.transcribers, CapabilityKind::Transcriber, id)
    }

    pub fn tool(&self, alias: &str) -> Result<ToolHandle> {
        self.tools
            .get(alias)
            .cloned()
            .ok_or_else(|| GatewayError::not_found(CapabilityKind::Tool, alias))
    }

    /// Resolve a request's tool names into a tool set. Any unknown name fails
    /// the whole lookup.
    pub fn tool_set<'a, I>(&self, aliases: I) -> Result<ToolSet>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut set = ToolSet::new();
        for alias in aliases {
            set.insert(alias, self.tool(alias)?);
        }
        Ok(set)
    }

    /// All registered models, sorted by id.
    pub fn models(&self) -> Vec<Model> {
        let mut models: Vec<Model> = self.models.values().cloned().collect();
        models.sort_by(|a, b| a.id.cmp(&b.id));
        models
    }

    /// Capabilities bound for a model id.
    pub fn capabilities(&self, id: &str) -> Vec<CapabilityKind> {
        [
            (self.completers.contains_key(id), CapabilityKind::Completer),
            (self.embedders.contains_key(id), CapabilityKind::Embedder),
            (self.renderers.contains_key(id), CapabilityKind::Renderer),
            (self.synthesizers.contains_key(id), CapabilityKind::Synthesizer),
            (self.transcribers.contains_key(id), CapabilityKind::Transcriber),
        ]
        .into_iter()
        .filter_map(|(bound, kind)| bound.then_some(kind))
        .collect()
    }

    /// Tool aliases, sorted.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }
}
