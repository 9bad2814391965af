//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.chatapp/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatAppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub assistant_name: Option<String>,
    pub welcome_message: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_ASSISTANT_NAME: &str = "ChatApp v2";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_WELCOME_MESSAGE: &str = "Hello, I am the ChatApp v2. \
    I am here to help you develop and deploy your project. \
    Tell me, what exactly would you like to build?";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub assistant_name: String,
    pub welcome_message: String,
    pub base_url: String,
    pub timeout: Duration,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.chatapp/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".chatapp").join("config.toml"))
}

/// Load config from `~/.chatapp/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ChatAppConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<ChatAppConfig, ConfigError> {
    let Some(path) = config_path() else {
        warn!("Could not determine home directory, using default config");
        return Ok(ChatAppConfig::default());
    };
    load_config_from(&path)
}

/// Same as [`load_config`] for an explicit path.
pub fn load_config_from(path: &Path) -> Result<ChatAppConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(ChatAppConfig::default());
    }

    let contents = fs::read_to_string(path)?;
    let config: ChatAppConfig = toml::from_str(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG_FILE: &str = r#"# ChatApp Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# assistant_name = "ChatApp v2"
# welcome_message = "Hello, I am the ChatApp v2. I am here to help you develop and deploy your project. Tell me, what exactly would you like to build?"

# [server]
# base_url = "http://localhost:8000"   # Or set CHATAPP_BASE_URL, or pass --base-url
# timeout_secs = 120                   # Or set CHATAPP_TIMEOUT_SECS, or pass --timeout-secs
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG_FILE) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_base_url` and `cli_timeout_secs` come from CLI flags (None = not specified).
pub fn resolve(
    config: &ChatAppConfig,
    cli_base_url: Option<&str>,
    cli_timeout_secs: Option<u64>,
) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(|s| s.to_string())
        .or_else(|| std::env::var("CHATAPP_BASE_URL").ok())
        .or_else(|| config.server.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Timeout: CLI → env → config → default; zero means "use the default"
    let env_timeout = std::env::var("CHATAPP_TIMEOUT_SECS").ok().and_then(|raw| {
        raw.trim()
            .parse::<u64>()
            .map_err(|e| warn!("Ignoring CHATAPP_TIMEOUT_SECS={:?}: {}", raw, e))
            .ok()
    });
    let timeout_secs = cli_timeout_secs
        .or(env_timeout)
        .or(config.server.timeout_secs)
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    ResolvedConfig {
        assistant_name: config
            .general
            .assistant_name
            .clone()
            .unwrap_or_else(|| DEFAULT_ASSISTANT_NAME.to_string()),
        welcome_message: config
            .general
            .welcome_message
            .clone()
            .unwrap_or_else(|| DEFAULT_WELCOME_MESSAGE.to_string()),
        base_url,
        timeout: Duration::from_secs(timeout_secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_empty() {
        let config = ChatAppConfig::default();
        assert!(config.general.assistant_name.is_none());
        assert!(config.server.base_url.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_for_general_section() {
        let resolved = resolve(&ChatAppConfig::default(), Some("http://cli"), Some(7));
        assert_eq!(resolved.assistant_name, DEFAULT_ASSISTANT_NAME);
        assert!(resolved.welcome_message.starts_with("Hello, I am the ChatApp v2."));
        assert!(resolved.welcome_message.ends_with("what exactly would you like to build?"));
    }

    #[test]
    fn test_resolve_cli_wins() {
        let config = ChatAppConfig {
            server: ServerConfig {
                base_url: Some("http://from-file:9000".to_string()),
                timeout_secs: Some(30),
            },
            ..Default::default()
        };
        let resolved = resolve(&config, Some("http://from-cli:1234"), Some(5));
        assert_eq!(resolved.base_url, "http://from-cli:1234");
        assert_eq!(resolved.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_resolve_zero_timeout_falls_back_to_default() {
        let resolved = resolve(&ChatAppConfig::default(), Some("http://cli"), Some(0));
        assert_eq!(resolved.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = ChatAppConfig {
            general: GeneralConfig {
                assistant_name: Some("Builder".to_string()),
                welcome_message: Some("Hi!".to_string()),
            },
            ..Default::default()
        };
        let resolved = resolve(&config, Some("http://cli"), Some(1));
        assert_eq!(resolved.assistant_name, "Builder");
        assert_eq!(resolved.welcome_message, "Hi!");
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
assistant_name = "Builder"
welcome_message = "What shall we make?"

[server]
base_url = "http://192.168.1.100:8000"
timeout_secs = 45
"#;
        let config: ChatAppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.assistant_name.as_deref(), Some("Builder"));
        assert_eq!(
            config.server.base_url.as_deref(),
            Some("http://192.168.1.100:8000")
        );
        assert_eq!(config.server.timeout_secs, Some(45));
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing; everything else stays default
        let toml_str = r#"
[server]
timeout_secs = 10
"#;
        let config: ChatAppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.timeout_secs, Some(10));
        assert!(config.server.base_url.is_none());
        assert!(config.general.welcome_message.is_none());
    }

    #[test]
    fn test_generated_default_parses_as_empty_config() {
        let config: ChatAppConfig = toml::from_str(DEFAULT_CONFIG_FILE).unwrap();
        assert!(config.general.assistant_name.is_none());
        assert!(config.server.timeout_secs.is_none());
    }

    #[test]
    fn test_load_config_from_missing_path_generates_default() {
        let dir = std::env::temp_dir().join(format!("chatapp-config-{}", std::process::id()));
        let path = dir.join("config.toml");
        let _ = fs::remove_dir_all(&dir);

        let config = load_config_from(&path).unwrap();
        assert!(config.server.base_url.is_none());
        assert!(path.exists());

        fs::write(&path, "[server\nbase_url = ").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));

        let _ = fs::remove_dir_all(&dir);
    }
}
