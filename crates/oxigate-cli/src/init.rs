//! `oxigate init` — write a starter configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use oxigate_core::config::{get_config_path, save_config, Config};

pub fn run(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = write_sample(config_path, force)?;
    println!();
    match path {
        Some(path) => println!("  {} created config at {}", "✓".green(), path.display()),
        None => println!(
            "  {} config already exists (use --force to overwrite)",
            "✓".green()
        ),
    }
    println!();
    Ok(())
}

/// Write `Config::sample()` unless a file exists and `force` is off.
/// Returns the written path, or `None` when nothing was written.
fn write_sample(config_path: Option<&Path>, force: bool) -> Result<Option<PathBuf>> {
    let path = config_path.map(PathBuf::from).unwrap_or_else(get_config_path);
    if path.exists() && !force {
        return Ok(None);
    }
    let written = save_config(&Config::sample(), Some(&path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(Some(written))
}
