//! Configuration loading
//!
//! Settings come from `.event-agent.toml` (optional) and are then overridden
//! by CLI flags / environment variables in `main`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::investigation::{DEFAULT_MAX_TURNS, DEFAULT_PLAN_RECOVERY_BUDGET};
use crate::llm::{OllamaClient, OpenAiClient, Oracle};
use crate::query::DEFAULT_QUERY_TIMEOUT_SECS;

/// Config file name searched for on disk
pub const CONFIG_FILE_NAME: &str = ".event-agent.toml";

/// Errors loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{0} environment variable is not set")]
    MissingCredential(String),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Walk up from `start` looking for `filename`
fn find_config_file_from(start: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(filename);
        if candidate.is_file() {
            return Some(candidate);
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return None,
        }
    }
}

/// Find a config file by walking up the directory tree, then checking global config.
///
/// Search order:
/// 1. Current directory and parent directories (walking up to root)
/// 2. Global config at ~/.config/event-agent/
fn find_config_file(filename: &str) -> Option<PathBuf> {
    if let Some(found) = std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config_file_from(&cwd, filename))
    {
        return Some(found);
    }

    let global_path = dirs::config_dir()?.join("event-agent").join(filename);
    global_path.is_file().then_some(global_path)
}

// ============================================================================
// Sections
// ============================================================================

/// Which oracle protocol to speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OracleBackend {
    /// OpenAI-compatible chat completions
    #[default]
    Openai,
    /// Local Ollama server
    Ollama,
}

/// Top-level configuration (from .event-agent.toml)
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentFileConfig {
    #[serde(default)]
    pub oracle: OracleSection,
    #[serde(default)]
    pub query: QuerySection,
    #[serde(default)]
    pub investigation: InvestigationSection,
}

/// Reasoning oracle section
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OracleSection {
    #[serde(default)]
    pub backend: OracleBackend,
    /// API root; the backend's default when unset
    pub url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key (openai backend only)
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

/// Event query service section
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuerySection {
    #[serde(default = "default_query_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Loop bounds
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvestigationSection {
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
    #[serde(default = "default_recovery_budget")]
    pub plan_recovery_budget: usize,
}

// Default value functions
fn default_model() -> String {
    "gpt-4.1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_query_url() -> String {
    "http://127.0.0.1:8080/query".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_QUERY_TIMEOUT_SECS
}

fn default_max_turns() -> usize {
    DEFAULT_MAX_TURNS
}

fn default_recovery_budget() -> usize {
    DEFAULT_PLAN_RECOVERY_BUDGET
}

impl Default for OracleSection {
    fn default() -> Self {
        Self {
            backend: OracleBackend::default(),
            url: None,
            model: default_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for QuerySection {
    fn default() -> Self {
        Self {
            url: default_query_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for InvestigationSection {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            plan_recovery_budget: default_recovery_budget(),
        }
    }
}

impl OracleSection {
    /// Configured URL or the backend's default endpoint
    pub fn resolved_url(&self) -> String {
        match (&self.url, self.backend) {
            (Some(url), _) => url.clone(),
            (None, OracleBackend::Openai) => crate::llm::DEFAULT_OPENAI_BASE.to_string(),
            (None, OracleBackend::Ollama) => crate::llm::DEFAULT_OLLAMA_URL.to_string(),
        }
    }

    /// Build the oracle client, reading credentials from the environment
    pub fn build_oracle(&self) -> Result<Box<dyn Oracle>, ConfigError> {
        let url = self.resolved_url();
        match self.backend {
            OracleBackend::Openai => {
                let api_key = std::env::var(&self.api_key_env)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| ConfigError::MissingCredential(self.api_key_env.clone()))?;
                Ok(Box::new(OpenAiClient::new(&url, &api_key, &self.model)))
            }
            OracleBackend::Ollama => Ok(Box::new(OllamaClient::new(&url, &self.model))),
        }
    }
}

impl AgentFileConfig {
    /// Load config from .event-agent.toml
    ///
    /// Search order:
    /// 1. Walk up directory tree from cwd looking for .event-agent.toml
    /// 2. Check ~/.config/event-agent/.event-agent.toml (global fallback)
    /// 3. Fall back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(config_path) = find_config_file(CONFIG_FILE_NAME) {
            tracing::debug!("Loading config from: {}", config_path.display());
            return Self::load_from_path(&config_path);
        }

        tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
        Ok(Self::default())
    }

    /// Load from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject settings the loop cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.investigation.max_turns == 0 {
            return Err(ConfigError::Invalid("investigation.max_turns must be at least 1".into()));
        }
        if self.query.timeout_secs == 0 {
            return Err(ConfigError::Invalid("query.timeout_secs must be at least 1".into()));
        }
        if url::Url::parse(&self.query.url).is_err() {
            return Err(ConfigError::Invalid(format!(
                "query.url is not a valid URL: {}",
                self.query.url
            )));
        }
        Ok(())
    }
}
