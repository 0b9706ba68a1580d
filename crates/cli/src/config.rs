use proto::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory under `$HOME` holding the user config and debug logs.
pub const CONFIG_DIR: &str = ".webscout";
const LOCAL_CONFIG_FILE: &str = "webscout.toml";
const HOME_CONFIG_FILE: &str = "config.toml";

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Model service and conversation loop settings.
    #[serde(default)]
    pub agent: AgentConfig,
    /// Web tool settings.
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Model service and conversation loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Ollama model name.
    pub model: String,
    /// Ollama host; `host`, `host:port` or a full URL.
    pub host: String,
    /// Request reasoning text from the model.
    pub think: bool,
    /// Model invocations allowed per question.
    pub max_iterations: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-oss".to_string(),
            host: agent::DEFAULT_OLLAMA_HOST.to_string(),
            think: true,
            max_iterations: agent::DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Web search / fetch tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Bearer key for the hosted web API (`OLLAMA_API_KEY`).
    pub api_key: String,
    /// Base URL of the hosted web API.
    pub base_url: String,
    /// Per-request timeout for tool calls.
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: tools::DEFAULT_WEB_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Loads configuration from explicit path, fallback locations, and env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path.map(|p| p.to_path_buf()).or_else(|| {
            // Look in current dir, then home dir
            let cwd = std::env::current_dir().ok()?.join(LOCAL_CONFIG_FILE);
            if cwd.exists() {
                return Some(cwd);
            }
            let home_config = home_dir()?.join(CONFIG_DIR).join(HOME_CONFIG_FILE);
            if home_config.exists() {
                return Some(home_config);
            }
            None
        });
        debug!(path = ?config_path, "Config file resolved");

        let mut config = if let Some(path) = config_path {
            let content = std::fs::read_to_string(&path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(|e| ConfigError::Toml(e.to_string()))?
        } else {
            Config::default()
        };

        config.apply_env();

        debug!(
            model = %config.agent.model,
            host = %config.agent.host,
            max_iterations = config.agent.max_iterations,
            web_base_url = %config.tools.base_url,
            api_key_set = !config.tools.api_key.is_empty(),
            "Config loaded"
        );
        Ok(config)
    }

    /// Applies environment variable overrides. Empty values are ignored.
    fn apply_env(&mut self) {
        if let Some(host) = non_empty_env("OLLAMA_HOST") {
            self.agent.host = host;
        }
        if let Some(key) = non_empty_env("OLLAMA_API_KEY") {
            self.tools.api_key = key;
        }
        if let Some(model) = non_empty_env("WEBSCOUT_MODEL") {
            self.agent.model = model;
        }
    }

    /// Rejects values the conversation loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.model.trim().is_empty() {
            return Err(invalid("agent.model", "must not be empty"));
        }
        if self.agent.max_iterations < 1 {
            return Err(invalid("agent.max_iterations", "must be at least 1"));
        }
        if self.tools.timeout_secs < 1 {
            return Err(invalid("tools.timeout_secs", "must be at least 1"));
        }
        Ok(())
    }
}

/// Returns `$HOME` as a path, if set.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
