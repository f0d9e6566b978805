//! `oxigate models` — show what the configuration binds.
//!
//! Local mode builds the registry exactly as `serve` would. `--remote` also
//! asks each provider for its model list.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use oxigate_core::config::{load_config, Config};
use oxigate_gateway::build_registry;
use oxigate_providers::{create_provider, ModelLister};

use crate::helpers::{fail_mark, list_or_none, ok_mark};

pub async fn run(config_path: Option<&Path>, remote: bool) -> Result<()> {
    let config = load_config(config_path).context("failed to load configuration")?;

    print_local(&config);
    if remote {
        print_remote(&config).await;
    }
    println!();
    Ok(())
}

fn print_local(config: &Config) {
    let registry = build_registry(config);

    println!();
    println!("{}", "Models".cyan().bold());
    let models = registry.models();
    if models.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for model in models {
        let kinds = registry.capabilities(&model.id);
        println!(
            "  {:<32} {}",
            model.id.bold(),
            list_or_none(kinds.iter().map(|k| k.as_str()))
        );
    }

    println!();
    println!("{}", "Tools".cyan().bold());
    println!("  {}", list_or_none(registry.tool_names()));
}

async fn print_remote(config: &Config) {
    println!();
    println!("{}", "Providers".cyan().bold());

    for (index, provider_config) in config.providers.iter().enumerate() {
        let entry = format!("providers[{index}]");
        let provider = match create_provider(provider_config, &entry) {
            Ok(p) => p,
            Err(e) => {
                println!("  {} {:<10} {}", fail_mark(), provider_config.provider_type, e);
                continue;
            }
        };

        match provider.list_models().await {
            Ok(models) => println!(
                "  {} {:<10} {}",
                ok_mark(),
                provider.name(),
                list_or_none(models.iter().map(|m| m.id.as_str()))
            ),
            Err(e) => println!("  {} {:<10} {}", fail_mark(), provider.name(), e),
        }
    }
}
