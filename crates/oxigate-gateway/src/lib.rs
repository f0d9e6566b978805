//! Oxigate gateway — the registry, its config-keyed factory, the auth chain,
//! and the OpenAI-compatible HTTP surface.
//!
//! - [`registry`] — model and tool bindings
//! - [`factory`] — configuration entries → registry bindings
//! - [`auth`] — authorizer chain and middleware
//! - [`handlers`] / [`server`] — axum routes

pub mod auth;
pub mod error;
pub mod factory;
pub mod handlers;
pub mod registry;
pub mod server;
pub mod wire;

pub use auth::{AuthChain, Authorizer, DenyAllAuthorizer, StaticTokenAuthorizer};
pub use error::ApiError;
pub use factory::{build_auth_chain, build_registry};
pub use handlers::AppState;
pub use registry::Registry;
pub use server::{app, router, serve};
