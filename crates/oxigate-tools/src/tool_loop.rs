//! Tool loop — drives completer ↔ tool rounds for one request.
//!
//! The model receives the tool set's definitions. Each tool call it returns
//! is executed and answered with a tool-result message, and the extended
//! conversation goes back to the model until it replies without tool calls.

use std::sync::Arc;

use tracing::{debug, info, warn};

use oxigate_core::types::{CompleteOptions, Message};
use oxigate_core::utils::truncate_string;
use oxigate_core::{GatewayError, Result};
use oxigate_providers::Completer;

use crate::tools::ToolSet;

/// Default maximum completer rounds per request.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

pub struct ToolLoop {
    completer: Arc<dyn Completer>,
    tools: ToolSet,
    max_iterations: usize,
}

impl ToolLoop {
    pub fn new(completer: Arc<dyn Completer>, tools: ToolSet) -> Self {
        Self {
            completer,
            tools,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Values below 1 are raised to 1.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    /// Run the loop and return the model's final reply.
    ///
    /// Fails with [`GatewayError::ToolLoopExhausted`] when the model is still
    /// asking for tools after `max_iterations` rounds.
    pub async fn run(
        &self,
        model: &str,
        mut messages: Vec<Message>,
        options: &CompleteOptions,
    ) -> Result<Message> {
        let mut options = options.clone();
        options.tools = self.tools.definitions();

        for iteration in 0..self.max_iterations {
            debug!(model = model, iteration = iteration, messages = messages.len(), "Completer call");

            let reply = self.completer.complete(model, &messages, &options).await?;
            if !reply.has_tool_calls() {
                debug!(model = model, iterations = iteration + 1, "Tool loop finished");
                return Ok(reply);
            }

            let tool_calls = reply.tool_calls.clone();
            messages.push(reply);

            for call in &tool_calls {
                info!(
                    tool = %call.function.name,
                    iteration = iteration,
                    "Executing tool call"
                );
                let result = self
                    .tools
                    .execute(&call.function.name, &call.function.arguments)
                    .await;
                debug!(
                    tool = %call.function.name,
                    result = %truncate_string(&result, 200),
                    "Tool result"
                );
                messages.push(Message::tool_result(&call.id, result));
            }
        }

        warn!(model = model, max_iterations = self.max_iterations, "Tool loop exhausted");
        Err(GatewayError::ToolLoopExhausted {
            iterations: self.max_iterations,
        })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
