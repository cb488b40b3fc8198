//! # Configuration
//!
//! Each setting is taken from the first source that has it, checking
//! CLI flags, then env vars, then the config file, then built-in defaults.
//!
//! Config lives at `~/.minichat/config.toml`. If missing on first run, a
//! template is written with every option present but commented out.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::inference::ProviderConfig;

// ============================================================================
// File layout (every field optional so partial files parse)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MiniChatConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub openrouter: OpenRouterSection,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind_addr: Option<String>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Default, Deserialize, Serialize)]
pub struct OpenRouterSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

impl fmt::Debug for OpenRouterSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRouterSection")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ClientConfig {
    pub backend_url: Option<String>,
    pub system_prompt: Option<String>,
    pub send_full_history: Option<bool>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

// ============================================================================
// Final values handed to the server and the client
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub bind_addr: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub provider: ProviderConfig,
    pub backend_url: String,
    pub system_prompt: String,
    pub send_full_history: bool,
}

/// Values given on the command line. `None` = flag not passed.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub bind_addr: Option<String>,
    pub backend_url: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.minichat/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".minichat").join("config.toml"))
}

/// Load config from `~/.minichat/config.toml`.
///
/// A missing file is replaced by the commented template and yields
/// `MiniChatConfig::default()`. A file that fails to parse is a
/// `ConfigError::Parse`.
pub fn load_config() -> Result<MiniChatConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(MiniChatConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<MiniChatConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(MiniChatConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: MiniChatConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Writes the commented template to `path`.
fn generate_default_config(path: &Path) {
    let default_content = r#"# MiniChat Configuration
# All settings are optional. Defaults are used for anything not specified.
# Precedence, highest first: CLI flags, env vars, this file, defaults.

# [server]
# bind_addr = "127.0.0.1:3000"       # Or MINICHAT_BIND_ADDR / --bind
# max_tokens = 512                   # Can lower the cap, never raise it
# timeout_secs = 30

# [openrouter]
# api_key = "sk-or-..."              # Or set OPENROUTER_API_KEY env var
# base_url = "https://openrouter.ai/api/v1"
# model = "openai/gpt-oss-20b:free"  # Or OPENROUTER_MODEL

# [client]
# backend_url = "http://127.0.0.1:3000"   # Or MINICHAT_BACKEND_URL / --backend
# system_prompt = "You are a helpful assistant."
# send_full_history = false          # true sends the whole transcript each turn
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Merge every source into concrete values.
pub fn resolve(config: &MiniChatConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with_env<F>(config: &MiniChatConfig, cli: &CliOverrides, env: F) -> ResolvedConfig
where
    F: Fn(&str) -> Option<String>,
{
    // Bind address: CLI → env → config → default
    let bind_addr = cli
        .bind_addr
        .clone()
        .or_else(|| env("MINICHAT_BIND_ADDR"))
        .or_else(|| config.server.bind_addr.clone())
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

    // Backend URL: CLI → env → config → default
    let backend_url = cli
        .backend_url
        .clone()
        .or_else(|| env("MINICHAT_BACKEND_URL"))
        .or_else(|| config.client.backend_url.clone())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

    // Credential: env → config. Empty values count as missing.
    let api_key = env("OPENROUTER_API_KEY")
        .or_else(|| config.openrouter.api_key.clone())
        .filter(|k| !k.trim().is_empty());

    let base_url = env("OPENROUTER_BASE_URL")
        .or_else(|| config.openrouter.base_url.clone())
        .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string());

    let default_model = env("OPENROUTER_MODEL")
        .or_else(|| config.openrouter.model.clone())
        .filter(|m| !m.trim().is_empty());

    ResolvedConfig {
        bind_addr,
        max_tokens: config
            .server
            .max_tokens
            .map_or(DEFAULT_MAX_TOKENS, |n| n.min(DEFAULT_MAX_TOKENS)),
        timeout: Duration::from_secs(
            config.server.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        ),
        provider: ProviderConfig {
            api_key,
            base_url,
            default_model,
        },
        backend_url,
        system_prompt: config
            .client
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        send_full_history: config.client.send_full_history.unwrap_or(false),
    }
}
