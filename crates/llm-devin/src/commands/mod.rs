//! CLI command handlers.

pub mod ask;
pub mod devin;
pub mod models;
pub mod prompt;
pub mod tools;

use llm_devin::{DevinConfig, DevinModel, PluginRegistry};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration with environment overrides applied.
    pub config: DevinConfig,
    /// API key from `--api-key`.
    pub api_key: Option<String>,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Registry with everything the plugin provides.
    pub fn registry(&self) -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        llm_devin::register(&mut registry, &self.config);
        if let Some(key) = &self.api_key {
            registry.register_model(DevinModel::new(self.config.clone()).with_api_key(key));
        }
        registry
    }
}
