//! Tool set — the tools available to one completion request.
//!
//! Tools are keyed by alias, which is also the function name the model sees,
//! so a call coming back from the model resolves without translation.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use tracing::{debug, warn};

use oxigate_core::types::ToolDefinition;

use super::observe::ToolHandle;

/// Name-keyed subset of registered tools.
#[derive(Clone, Debug, Default)]
pub struct ToolSet {
    tools: BTreeMap<String, ToolHandle>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool under `alias`. Overwrites any previous tool with that alias.
    pub fn insert(&mut self, alias: impl Into<String>, tool: ToolHandle) {
        self.tools.insert(alias.into(), tool);
    }

    pub fn get(&self, alias: &str) -> Option<&ToolHandle> {
        self.tools.get(alias)
    }

    /// Aliases, sorted.
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Model-facing definitions, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|(alias, handle)| {
                let tool = handle.tool();
                ToolDefinition::new(alias.as_str(), tool.description(), tool.parameters())
            })
            .collect()
    }

    /// Execute a tool call from the model.
    ///
    /// Never fails: unknown tools, malformed arguments and tool errors come
    /// back as an `Error ...` string for the model to read.
    pub async fn execute(&self, name: &str, arguments: &str) -> String {
        let Some(tool) = self.tools.get(name) else {
            warn!(tool = name, "tool not found");
            return format!("Error: Tool '{name}' not found");
        };

        let params: HashMap<String, Value> = if arguments.trim().is_empty() {
            HashMap::new()
        } else {
            match serde_json::from_str(arguments) {
                Ok(params) => params,
                Err(e) => {
                    warn!(tool = name, error = %e, "malformed tool arguments");
                    return format!("Error: invalid arguments for {name}: {e}");
                }
            }
        };

        match tool.execute(name, &params).await {
            Ok(Value::String(text)) => text,
            Ok(value) => {
                debug!(tool = name, "tool returned structured result");
                value.to_string()
            }
            Err(e) => format!("Error executing {name}: {e}"),
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
