//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use oxigate_core::config;
//!
//! let cfg = config::load_config(None).expect("config");
//! println!("Listening on {}", cfg.server.address());
//! ```

pub mod loader;
pub mod schema;

// Re-export key types
pub use loader::{get_config_path, load_config, save_config, ConfigError};
pub use schema::{
    AuthorizerConfig, Config, ModelConfig, ProviderConfig, ServerConfig, ToolConfig,
    ToolLoopConfig,
};
