//! Config loader — reads `~/.oxigate/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.oxigate/config.json` (or an explicit path)
//! 3. Environment variables `OXIGATE_<SECTION>__<FIELD>` (override JSON)
//!
//! A missing file yields defaults. An unreadable or malformed file is an
//! error: a gateway silently starting without its backends is worse than
//! refusing to start.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::schema::{AuthorizerConfig, Config};

/// Errors raised while reading or writing the config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from `path` (or the default path) + env vars.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    load_config_from_path(&config_path)
}

fn load_config_from_path(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Ok(apply_env_overrides(Config::default()));
    }

    debug!("Loading config from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config: Config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(apply_env_overrides(config))
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    let io_err = |source| ConfigError::Io {
        path: config_path.clone(),
        source,
    };

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
        path: config_path.clone(),
        source,
    })?;

    std::fs::write(&config_path, json).map_err(io_err)?;
    debug!("Config saved to {}", config_path.display());
    Ok(config_path)
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `OXIGATE_SERVER__HOST` → `server.host`
/// - `OXIGATE_SERVER__PORT` → `server.port`
/// - `OXIGATE_SERVER__STATIC_DIR` → `server.static_dir`
/// - `OXIGATE_AUTH__TOKEN` → appends a static bearer-token authorizer
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("OXIGATE_SERVER__HOST") {
        config.server.host = val;
    }
    if let Ok(val) = std::env::var("OXIGATE_SERVER__PORT") {
        if let Ok(p) = val.parse::<u16>() {
            config.server.port = p;
        }
    }
    if let Ok(val) = std::env::var("OXIGATE_SERVER__STATIC_DIR") {
        config.server.static_dir = val;
    }
    if let Ok(val) = std::env::var("OXIGATE_AUTH__TOKEN") {
        if !val.is_empty() {
            config.authorizers.push(AuthorizerConfig {
                authorizer_type: "static".to_string(),
                token: val,
            });
        }
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.json")).unwrap();
        assert!(config.providers.is_empty());
        assert_eq!(config.server.static_dir, "public");
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "providers": [
                { "type": "ollama", "models": { "llama3": {} } }
            ],
            "tools": {
                "web": { "type": "searxng", "url": "http://localhost:8888" }
            }
        }"#,
        );

        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.providers[0].provider_type, "ollama");
        assert!(config.providers[0].models.contains_key("llama3"));
        assert_eq!(config.tools["web"].url.as_deref(), Some("http://localhost:8888"));
    }

    #[test]
    fn test_load_invalid_json_is_error() {
        let file = write_temp_json("not valid json {{{");
        let err = load_config_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn test_load_empty_json() {
        let file = write_temp_json("{}");
        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.tool_loop.max_iterations, 10);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let saved = save_config(&Config::sample(), Some(&path)).unwrap();
        assert_eq!(saved, path);

        let reloaded = load_config_from_path(&path).unwrap();
        assert_eq!(reloaded.providers[0].provider_type, "ollama");
        assert_eq!(
            reloaded.providers[0].models["nomic-embed-text"].model_type.as_deref(),
            Some("embedder")
        );
    }

    #[test]
    fn test_env_override_port_and_token() {
        std::env::set_var("OXIGATE_SERVER__PORT", "9999");
        std::env::set_var("OXIGATE_AUTH__TOKEN", "env-token");
        let config = apply_env_overrides(Config::default());
        std::env::remove_var("OXIGATE_SERVER__PORT");
        std::env::remove_var("OXIGATE_AUTH__TOKEN");

        assert_eq!(config.server.port, 9999);
        assert_eq!(config.authorizers.len(), 1);
        assert_eq!(config.authorizers[0].authorizer_type, "static");
        assert_eq!(config.authorizers[0].token, "env-token");
    }
}
