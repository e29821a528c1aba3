//! Devin and DeepWiki as a CLI plugin.
//!
//! Registers three things into a [`PluginRegistry`]:
//!
//! - the `devin` model, which runs each prompt as a Devin session and streams
//!   the agent's messages once the session finishes
//! - the `ask_question` tool, which asks DeepWiki about a GitHub repository
//! - the `devin` command, a greeting
//!
//! ```no_run
//! use llm_devin::{DevinConfig, PluginRegistry};
//!
//! let config = DevinConfig::load(None)?;
//! let mut registry = PluginRegistry::new();
//! llm_devin::register(&mut registry, &config);
//! assert!(registry.model("devin").is_ok());
//! # Ok::<(), llm_devin::PluginError>(())
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod plugin;
pub mod tool;

pub use config::{DevinConfig, ResolvedSecret, SecretSource};
pub use error::{PluginError, Result};
pub use model::DevinModel;
pub use plugin::{Command, Model, ModelResponse, PluginRegistry, TextStream, Tool, register};
pub use tool::DeepWikiTool;

/// Greeting printed by the `devin` command.
pub fn greeting(name: &str) -> String {
    format!("Hello from Devin AI to {}!", name)
}
