//! Tool instrumentation.
//!
//! Every registered tool is wrapped exactly once in an [`InstrumentedTool`],
//! which opens a `tool.execute` span per call and keeps call/error/latency
//! counters. [`ToolHandle`] makes "already wrapped" a property of the value,
//! so wrapping twice is impossible.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, info_span, warn, Instrument};

use super::base::{Tool, ToolError};

// ─────────────────────────────────────────────
// InstrumentedTool
// ─────────────────────────────────────────────

/// Snapshot of a tool's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ToolStats {
    pub calls: u64,
    pub errors: u64,
    pub total_latency: Duration,
}

/// A tool decorated with tracing and counters.
pub struct InstrumentedTool {
    name: String,
    inner: Arc<dyn Tool>,
    calls: AtomicU64,
    errors: AtomicU64,
    latency_us: AtomicU64,
}

impl InstrumentedTool {
    pub fn new(name: impl Into<String>, inner: Arc<dyn Tool>) -> Self {
        InstrumentedTool {
            name: name.into(),
            inner,
            calls: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            latency_us: AtomicU64::new(0),
        }
    }

    /// Instrumentation name (the tool kind it was registered as).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inner(&self) -> &dyn Tool {
        self.inner.as_ref()
    }

    pub fn stats(&self) -> ToolStats {
        ToolStats {
            calls: self.calls.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            total_latency: Duration::from_micros(self.latency_us.load(Ordering::Relaxed)),
        }
    }

    /// Execute the wrapped tool inside a span tagged with its lookup alias.
    pub async fn execute(
        &self,
        alias: &str,
        params: &HashMap<String, Value>,
    ) -> Result<Value, ToolError> {
        let span = info_span!("tool.execute", tool = %self.name, alias = alias);

        async {
            let started = Instant::now();
            let result = self.inner.execute(params).await;
            let elapsed = started.elapsed();

            self.calls.fetch_add(1, Ordering::Relaxed);
            self.latency_us
                .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);

            match &result {
                Ok(_) => debug!(elapsed_ms = elapsed.as_millis() as u64, "tool finished"),
                Err(e) => {
                    self.errors.fetch_add(1, Ordering::Relaxed);
                    warn!(error = %e, elapsed_ms = elapsed.as_millis() as u64, "tool failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }
}

// ─────────────────────────────────────────────
// ToolHandle
// ─────────────────────────────────────────────

/// A registered tool, either bare or instrumented.
#[derive(Clone)]
pub enum ToolHandle {
    Plain(Arc<dyn Tool>),
    Instrumented(Arc<InstrumentedTool>),
}

impl ToolHandle {
    /// Wrap a plain tool; an instrumented one is returned as is.
    pub fn instrument(self, name: &str) -> Self {
        match self {
            ToolHandle::Plain(tool) => {
                ToolHandle::Instrumented(Arc::new(InstrumentedTool::new(name, tool)))
            }
            instrumented @ ToolHandle::Instrumented(_) => instrumented,
        }
    }

    pub fn is_instrumented(&self) -> bool {
        matches!(self, ToolHandle::Instrumented(_))
    }

    /// The underlying tool (description and schema come from here).
    pub fn tool(&self) -> &dyn Tool {
        match self {
            ToolHandle::Plain(tool) => tool.as_ref(),
            ToolHandle::Instrumented(tool) => tool.inner(),
        }
    }

    pub fn stats(&self) -> Option<ToolStats> {
        match self {
            ToolHandle::Plain(_) => None,
            ToolHandle::Instrumented(tool) => Some(tool.stats()),
        }
    }

    pub async fn execute(
        &self,
        alias: &str,
        params: &HashMap<String, Value>,
    ) -> Result<Value, ToolError> {
        match self {
            ToolHandle::Plain(tool) => tool.execute(params).await,
            ToolHandle::Instrumented(tool) => tool.execute(alias, params).await,
        }
    }
}

impl From<Arc<dyn Tool>> for ToolHandle {
    fn from(tool: Arc<dyn Tool>) -> Self {
        ToolHandle::Plain(tool)
    }
}

impl From<Arc<InstrumentedTool>> for ToolHandle {
    fn from(tool: Arc<InstrumentedTool>) -> Self {
        ToolHandle::Instrumented(tool)
    }
}

impl std::fmt::Debug for ToolHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolHandle::Plain(tool) => f.debug_tuple("Plain").field(&tool.name()).finish(),
            ToolHandle::Instrumented(tool) => {
                f.debug_tuple("Instrumented").field(&tool.name()).finish()
            }
        }
    }
}
