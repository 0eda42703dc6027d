//! Configuration management for the gateway
//!
//! Values come from three layers, later ones winning:
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory (or an explicit path)
//! 3. Environment variables (a `.env` file is loaded first if present)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub agent: AgentConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins accepted by the CORS layer
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

/// Upstream model provider settings (OpenAI-compatible Chat Completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key; agents stay unconfigured for the whole process when this is absent
    pub api_key: Option<String>,
    /// Base URL, e.g. `https://api.openai.com/v1` or `https://api.deepseek.com`
    pub api_base: String,
    pub model: String,
    pub max_tokens: Option<usize>,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://api.openai.com/v1".to_string(),
            model: "deepseek-chat".to_string(),
            max_tokens: None,
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    /// True when a non-empty API key is available
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Agent used when a chat request names none
    pub default_agent: String,
    /// Messages kept per conversation
    pub max_history: usize,
    /// Upper bound on model turns in the tool loop
    pub max_iterations: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            default_agent: "simple_chat".to_string(),
            max_history: 50,
            max_iterations: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        // Missing .env is the normal case
        let _ = dotenvy::dotenv();

        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Config::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from an explicit file, then apply environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::from_file(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML file without consulting the environment
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Get the configuration file path
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "arena")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Overlay environment variables onto the loaded values
    ///
    /// The lookup is injected so tests do not have to mutate the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(base) = non_empty("OPENAI_API_BASE") {
            self.llm.api_base = base;
        }
        if let Some(model) = non_empty("OPENAI_MODEL") {
            self.llm.model = model;
        }
        if let Some(level) = non_empty("LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }
        if let Some(host) = non_empty("ARENA_HOST") {
            self.server.host = host;
        }
        if let Some(port) = non_empty("ARENA_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid ARENA_PORT value '{}'", port),
            }
        }
    }
}
