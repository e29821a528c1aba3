//! Plugin error types.

use std::path::PathBuf;

/// Result type alias for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;

/// Errors raised by the plugin surface.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// Failed to read a config file.
    #[error("failed to read config file '{}': {source}", path.display())]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    ParseConfig(#[from] toml::de::Error),

    /// No credential found through any resolution method.
    #[error("Devin API key not found. Pass --api-key, set {env_var}, or add api_key to the [api] config section")]
    MissingApiKey { env_var: String },

    /// Devin API failure.
    #[error(transparent)]
    Devin(#[from] devin_client::Error),

    /// No model registered under this id.
    #[error("unknown model '{0}'")]
    UnknownModel(String),

    /// No tool registered under this name.
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    /// Tool arguments did not match the tool's schema.
    #[error("invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },
}

impl PluginError {
    /// Create an invalid arguments error.
    pub fn invalid_arguments(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }
}
