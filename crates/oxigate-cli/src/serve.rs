//! `oxigate serve` — build the registry and run the HTTP gateway.
//!
//! Startup sequence:
//! 1. Load config (file + env overrides)
//! 2. Build registry and auth chain
//! 3. Bind the listener
//! 4. Serve until Ctrl+C cancels the root token

use std::path::Path;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use oxigate_core::config::load_config;

use crate::helpers;

pub async fn run(config_path: Option<&Path>, port: Option<u16>) -> Result<()> {
    let mut config = load_config(config_path).context("failed to load configuration")?;
    if let Some(port) = port {
        config.server.port = port;
    }

    helpers::print_banner("Gateway");

    let shutdown = CancellationToken::new();
    let app = oxigate_gateway::app(&config, shutdown.clone());

    let address = config.server.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Shutdown requested");
                    shutdown.cancel();
                }
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C"),
            }
        });
    }

    oxigate_gateway::serve(listener, app, shutdown).await
}
