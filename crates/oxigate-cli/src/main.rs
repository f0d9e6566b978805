//! Oxigate CLI — entry point.
//!
//! # Commands
//!
//! - `oxigate serve [--config PATH] [--logs]` — run the gateway
//! - `oxigate models [--config PATH] [--remote]` — show configured models
//! - `oxigate init [--config PATH] [--force]` — write a starter config

mod helpers;
mod init;
mod models;
mod serve;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Oxigate: one OpenAI-compatible API in front of many AI backends
#[derive(Parser)]
#[command(name = "oxigate", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Config file (defaults to ~/.oxigate/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the listen port
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// List the models and tools the config binds
    Models {
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also ask every provider which models it serves
        #[arg(long, default_value_t = false)]
        remote: bool,
    },

    /// Write a starter configuration
    Init {
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, port, logs } => {
            init_logging(logs);
            serve::run(config.as_deref(), port).await
        }
        Commands::Models { config, remote } => {
            init_logging(false);
            models::run(config.as_deref(), remote).await
        }
        Commands::Init { config, force } => init::run(config.as_deref(), force),
    }
}

/// Initialize tracing/logging.
///
/// `--logs` forces debug output for Oxigate crates; otherwise `RUST_LOG`
/// applies, defaulting to `info`.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("oxigate=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["oxigate", "serve", "--config", "/tmp/gw.json", "--port", "9000", "--logs"]).unwrap();
        match cli.command {
            Commands::Serve { config, port, logs } => {
                assert_eq!(config, Some(PathBuf::from("/tmp/gw.json")));
                assert_eq!(port, Some(9000));
                assert!(logs);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_models_defaults() {
        let cli = Cli::try_parse_from(["oxigate", "models"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Models {
                config: None,
                remote: false
            }
        ));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["oxigate", "agent"]).is_err());
    }
}
