//! Oxigate Tools — tool contract, built-in tools, and the tool-calling loop.
//!
//! This crate contains:
//! - **tools**: Tool trait, instrumentation, per-request tool set, and
//!   built-in tools (search, draw, custom HTTP)
//! - **tool_loop**: The completer ↔ tool-calling loop

pub mod tool_loop;
pub mod tools;

pub use tool_loop::{ToolLoop, DEFAULT_MAX_ITERATIONS};
pub use tools::{Tool, ToolError, ToolHandle, ToolSet};
