//! Oxigate core — the canonical data model, error taxonomy, and configuration
//! shared by the provider, tool, and gateway crates.

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use error::{CapabilityKind, GatewayError, Result};
