//! Configuration management for nbpilot
//!
//! Loads and saves the JSON config holding LLM backends, agent defaults and
//! declared assistants.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod paths;

pub use paths::{config_path, data_dir, workspace_path};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown LLM provider: {0}")]
    UnknownProvider(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// One OpenAI-compatible completion backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    pub model_name: String,
}

impl LlmConfig {
    pub fn new(base_url: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: String::new(),
            api_version: None,
            model_name: model_name.into(),
        }
    }

    /// Get the API key, if one is set
    pub fn api_key(&self) -> Option<&str> {
        if self.api_key.is_empty() {
            None
        } else {
            Some(&self.api_key)
        }
    }
}

fn default_llm() -> BTreeMap<String, LlmConfig> {
    let mut llm = BTreeMap::new();
    llm.insert(
        "deepseek".to_string(),
        LlmConfig::new("https://api.deepseek.com/v1", "deepseek-chat"),
    );
    llm.insert(
        "openai".to_string(),
        LlmConfig::new("https://api.openai.com/v1", "gpt-4o-mini"),
    );
    llm.insert(
        "ollama".to_string(),
        LlmConfig::new("http://localhost:11434/v1", "qwen2.5"),
    );
    llm
}

/// Defaults for the dispatch loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDefaults {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default = "default_max_errors")]
    pub max_errors: u32,
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    #[serde(default = "default_max_delegation_depth")]
    pub max_delegation_depth: usize,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_workspace")]
    pub workspace: String,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            role: None,
            task: None,
            max_errors: default_max_errors(),
            max_turns: default_max_turns(),
            max_delegation_depth: default_max_delegation_depth(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            workspace: default_workspace(),
        }
    }
}

fn default_provider() -> String {
    "deepseek".to_string()
}

fn default_max_errors() -> u32 {
    3
}

fn default_max_turns() -> u32 {
    20
}

fn default_max_delegation_depth() -> usize {
    4
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

fn default_workspace() -> String {
    "~/.nbpilot/workspace".to_string()
}

/// A peer assistant the top-level agent may delegate to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Names of built-in tools granted to this assistant
    #[serde(default)]
    pub tools: Vec<String>,
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_llm")]
    pub llm: BTreeMap<String, LlmConfig>,
    #[serde(default)]
    pub agent: AgentDefaults,
    #[serde(default)]
    pub assistants: Vec<AssistantConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: default_llm(),
            agent: AgentDefaults::default(),
            assistants: Vec::new(),
        }
    }
}

impl Config {
    /// Load from the default location
    pub async fn load() -> Result<Self> {
        let path = config_path();
        Self::load_from(&path).await
    }

    /// Load from a specific location, falling back to defaults when absent
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        debug!("Loading config from {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save to the default location
    pub async fn save(&self) -> Result<()> {
        let path = config_path();
        self.save_to(&path).await
    }

    /// Save to a specific location
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        debug!("Writing config to {:?}", path);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Look up a named LLM backend
    pub fn llm(&self, name: &str) -> Result<&LlmConfig> {
        self.llm
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProvider(name.to_string()))
    }

    /// The backend named by `agent.provider`
    pub fn default_llm(&self) -> Result<&LlmConfig> {
        self.llm(&self.agent.provider)
    }

    /// Names of all configured backends, sorted
    pub fn providers(&self) -> Vec<&str> {
        self.llm.keys().map(String::as_str).collect()
    }

    /// Find a declared assistant by name
    pub fn assistant(&self, name: &str) -> Option<&AssistantConfig> {
        self.assistants.iter().find(|a| a.name == name)
    }

    /// Resolved workspace directory for the file tools
    pub fn workspace_path(&self) -> PathBuf {
        paths::expand_home(&self.agent.workspace)
    }
}

/// Write the default config if absent and create the workspace
pub async fn init() -> Result<Config> {
    let config_path = config_path();

    if config_path.exists() {
        warn!("Config already exists at {:?}", config_path);
    } else {
        let config = Config::default();
        config.save().await?;
        info!("Config written to {:?}", config_path);
    }

    let config = Config::load().await?;
    let workspace = config.workspace_path();
    paths::ensure_dir(&workspace).await?;
    info!("Workspace ready at {:?}", workspace);

    Ok(config)
}
