//! Configuration loading and credential resolution.
//!
//! Resolution order (later overrides earlier):
//! 1. Built-in defaults
//! 2. `config.toml` in the config directory (`LLM_DEVIN_CONFIG_DIR` or the
//!    platform config dir)
//! 3. Environment variables (`DEVIN_API_BASE`, `DEEPWIKI_MCP_URL`)
//! 4. CLI arguments (handled by the binaries)
//!
//! The API key has its own chain: explicit value, then `DEVIN_API_KEY`, then
//! the config file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use devin_client::{DevinClient, PollOptions};
use devin_mcp::DeepWiki;
use serde::{Deserialize, Serialize};

use crate::error::{PluginError, Result};

/// Environment variable holding the Devin bearer token.
pub const API_KEY_ENV: &str = "DEVIN_API_KEY";

/// Environment variable overriding the Devin API base URL.
pub const API_BASE_ENV: &str = "DEVIN_API_BASE";

/// Environment variable overriding the DeepWiki SSE URL.
pub const DEEPWIKI_URL_ENV: &str = "DEEPWIKI_MCP_URL";

/// Environment variable overriding the config directory.
const CONFIG_DIR_ENV: &str = "LLM_DEVIN_CONFIG_DIR";

/// Config filename within the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Application name for directory resolution.
const APP_NAME: &str = "llm-devin";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevinConfig {
    /// Devin sessions API.
    pub api: ApiConfig,
    /// Session polling.
    pub poll: PollConfig,
    /// DeepWiki MCP server.
    pub deepwiki: DeepWikiConfig,
}

/// `[api]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Plaintext key; prefer the environment variable.
    pub api_key: Option<String>,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    /// Reuse the session for identical prompts.
    pub idempotent: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: devin_client::client::DEFAULT_BASE_URL.to_string(),
            api_key: None,
            connect_timeout_secs: devin_client::client::DEFAULT_CONNECT_TIMEOUT.as_secs(),
            read_timeout_secs: devin_client::client::DEFAULT_READ_TIMEOUT.as_secs(),
            idempotent: true,
        }
    }
}

/// `[poll]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_secs: u64,
    pub max_polls: Option<u32>,
    pub deadline_secs: Option<u64>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: devin_client::DEFAULT_POLL_INTERVAL.as_secs(),
            max_polls: None,
            deadline_secs: None,
        }
    }
}

/// `[deepwiki]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepWikiConfig {
    pub url: String,
    pub connect_timeout_secs: u64,
    pub call_timeout_secs: u64,
}

impl Default for DeepWikiConfig {
    fn default() -> Self {
        Self {
            url: devin_mcp::DEEPWIKI_SSE_URL.to_string(),
            connect_timeout_secs: devin_mcp::DEFAULT_CONNECT_TIMEOUT.as_secs(),
            call_timeout_secs: devin_mcp::DEFAULT_CALL_TIMEOUT.as_secs(),
        }
    }
}

/// Result of API key resolution with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The secret value.
    pub value: String,
    /// Where the secret was found.
    pub source: SecretSource,
}

/// Where a secret was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Passed in directly (CLI flag or caller).
    Explicit,
    /// Environment variable.
    EnvVar(String),
    /// Config file (plaintext, not recommended).
    ConfigFile,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::Explicit => write!(f, "explicit value"),
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::ConfigFile => write!(f, "config file (plaintext)"),
        }
    }
}

impl DevinConfig {
    /// Load from an explicit file, or from the default location if it exists.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    /// Environment overrides are applied afterwards.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match config_path() {
                Some(default) if default.is_file() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| PluginError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text)?;
        if config.api.api_key.is_some() {
            tracing::warn!(
                path = %path.display(),
                "config file contains a plaintext api_key; prefer {}", API_KEY_ENV
            );
        }
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Overlay endpoint overrides from the environment.
    pub fn apply_env(&mut self) {
        if let Ok(base) = std::env::var(API_BASE_ENV)
            && !base.is_empty()
        {
            self.api.base_url = base;
        }
        if let Ok(url) = std::env::var(DEEPWIKI_URL_ENV)
            && !url.is_empty()
        {
            self.deepwiki.url = url;
        }
    }

    /// Resolve the Devin API key.
    ///
    /// Checks in order: `explicit`, the `DEVIN_API_KEY` env var, the config file.
    pub fn resolve_api_key(&self, explicit: Option<&str>) -> Option<ResolvedSecret> {
        if let Some(value) = explicit.filter(|v| !v.is_empty()) {
            return Some(ResolvedSecret {
                value: value.to_string(),
                source: SecretSource::Explicit,
            });
        }

        if let Ok(value) = std::env::var(API_KEY_ENV)
            && !value.is_empty()
        {
            return Some(ResolvedSecret {
                value,
                source: SecretSource::EnvVar(API_KEY_ENV.to_string()),
            });
        }

        self.api
            .api_key
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(|v| ResolvedSecret {
                value: v.to_string(),
                source: SecretSource::ConfigFile,
            })
    }

    /// Build a Devin client, resolving the key as in [`Self::resolve_api_key`].
    pub fn devin_client(&self, explicit_key: Option<&str>) -> Result<DevinClient> {
        let secret = self
            .resolve_api_key(explicit_key)
            .ok_or_else(|| PluginError::MissingApiKey {
                env_var: API_KEY_ENV.to_string(),
            })?;
        tracing::debug!(source = %secret.source, "resolved Devin API key");

        Ok(DevinClient::builder()
            .base_url(&self.api.base_url)
            .auth_token(secret.value)
            .connect_timeout(Duration::from_secs(self.api.connect_timeout_secs))
            .read_timeout(Duration::from_secs(self.api.read_timeout_secs))
            .build()?)
    }

    /// Poll bounds from the `[poll]` section.
    pub fn poll_options(&self) -> PollOptions {
        let mut options =
            PollOptions::default().with_interval(Duration::from_secs(self.poll.interval_secs));
        if let Some(max) = self.poll.max_polls {
            options = options.with_max_polls(max);
        }
        if let Some(secs) = self.poll.deadline_secs {
            options = options.with_deadline(Duration::from_secs(secs));
        }
        options
    }

    /// DeepWiki client for a repository, using the `[deepwiki]` section.
    pub fn deepwiki(&self, repository: impl Into<String>) -> DeepWiki {
        DeepWiki::new(repository)
            .with_server_url(&self.deepwiki.url)
            .with_connect_timeout(Duration::from_secs(self.deepwiki.connect_timeout_secs))
            .with_call_timeout(Duration::from_secs(self.deepwiki.call_timeout_secs))
    }
}

/// Config directory: `LLM_DEVIN_CONFIG_DIR`, else the platform default.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Default config file path.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DevinConfig::default();
        assert_eq!(config.api.base_url, "https://api.devin.ai");
        assert_eq!(config.api.connect_timeout_secs, 5);
        assert_eq!(config.api.read_timeout_secs, 10);
        assert!(config.api.idempotent);
        assert_eq!(config.poll.interval_secs, 5);
        assert_eq!(config.deepwiki.url, "https://mcp.deepwiki.com/sse");
        assert_eq!(config.deepwiki.connect_timeout_secs, 60);
    }

    #[test]
    fn test_default_poll_options_are_unbounded() {
        let options = DevinConfig::default().poll_options();
        assert_eq!(options, PollOptions::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[poll]
interval_secs = 2
max_polls = 30

[deepwiki]
url = "http://localhost:9000/sse"
"#
        )
        .unwrap();

        let config = DevinConfig::from_file(file.path()).unwrap();
        assert_eq!(config.poll.interval_secs, 2);
        assert_eq!(config.poll.max_polls, Some(30));
        assert_eq!(config.poll.deadline_secs, None);
        assert_eq!(config.deepwiki.url, "http://localhost:9000/sse");
        assert_eq!(config.deepwiki.call_timeout_secs, 300);
        assert_eq!(config.api, ApiConfig::default());

        let options = config.poll_options();
        assert_eq!(options.interval, Duration::from_secs(2));
        assert_eq!(options.max_polls, Some(30));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = DevinConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, PluginError::ReadConfig { .. }));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[poll\ninterval_secs = ").unwrap();
        let err = DevinConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, PluginError::ParseConfig(_)));
    }

    #[test]
    fn test_explicit_key_wins() {
        let mut config = DevinConfig::default();
        config.api.api_key = Some("from-file".to_string());

        let secret = config.resolve_api_key(Some("from-flag")).unwrap();
        assert_eq!(secret.value, "from-flag");
        assert_eq!(secret.source, SecretSource::Explicit);
    }

    #[test]
    fn test_empty_explicit_key_is_ignored() {
        let mut config = DevinConfig::default();
        config.api.api_key = Some("from-file".to_string());

        // The env var may be set on the machine running the tests.
        let secret = config.resolve_api_key(Some("")).unwrap();
        assert_ne!(secret.source, SecretSource::Explicit);
    }

    #[test]
    fn test_secret_source_display() {
        assert_eq!(SecretSource::Explicit.to_string(), "explicit value");
        assert_eq!(
            SecretSource::EnvVar("DEVIN_API_KEY".into()).to_string(),
            "env var DEVIN_API_KEY"
        );
        assert_eq!(SecretSource::ConfigFile.to_string(), "config file (plaintext)");
    }

    #[test]
    fn test_deepwiki_from_config() {
        let mut config = DevinConfig::default();
        config.deepwiki.url = "http://localhost:1/sse".to_string();
        let deepwiki = config.deepwiki("a/b");
        assert_eq!(deepwiki.repository(), "a/b");
        assert_eq!(deepwiki.server_url(), "http://localhost:1/sse");
    }
}
