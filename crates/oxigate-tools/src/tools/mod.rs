//! Tool modules for Oxigate.

pub mod base;
pub mod custom;
pub mod draw;
pub mod observe;
pub mod search;
pub mod toolset;

pub use base::{require_string, Tool, ToolError};
pub use custom::CustomTool;
pub use draw::DrawTool;
pub use observe::{InstrumentedTool, ToolHandle, ToolStats};
pub use search::{BingTool, DuckDuckGoTool, SearchResult, SearxngTool, TavilyTool};
pub use toolset::ToolSet;
