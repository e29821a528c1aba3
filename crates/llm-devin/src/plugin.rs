//! Plugin surface: models, tools, and commands a host can register.
//!
//! The registry is a plain collection. Hosts call [`register`] once and then
//! look entries up by id or name.

use std::collections::BTreeMap;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::DevinConfig;
use crate::error::{PluginError, Result};
use crate::model::DevinModel;
use crate::tool::DeepWikiTool;

/// Text chunks produced by a model.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Result of starting a model run.
pub struct ModelResponse {
    /// Where the run can be followed, if the backend provides one.
    pub url: Option<String>,
    /// Output chunks in order.
    pub stream: TextStream,
}

impl std::fmt::Debug for ModelResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelResponse")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// A model that turns a prompt into text.
#[async_trait]
pub trait Model: Send + Sync {
    /// Identifier users select the model by.
    fn model_id(&self) -> &str;

    /// Whether output arrives as multiple chunks.
    fn can_stream(&self) -> bool {
        false
    }

    /// Start a run. Cancelling `cancel` ends the stream with an error.
    async fn execute(&self, prompt: &str, cancel: CancellationToken) -> Result<ModelResponse>;
}

/// A tool callable with JSON arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema for the arguments object.
    fn parameters(&self) -> Value;

    /// Run the tool and return its text output.
    async fn call(&self, args: Value) -> Result<String>;
}

/// A named text command.
#[derive(Debug, Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    pub about: &'static str,
    pub run: fn(&str) -> String,
}

/// Registered models, tools, and commands.
#[derive(Default)]
pub struct PluginRegistry {
    models: BTreeMap<String, Arc<dyn Model>>,
    tools: BTreeMap<String, Arc<dyn Tool>>,
    commands: BTreeMap<&'static str, Command>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model, replacing any with the same id.
    pub fn register_model<M: Model + 'static>(&mut self, model: M) {
        let id = model.model_id().to_string();
        tracing::debug!(model = %id, "registered model");
        self.models.insert(id, Arc::new(model));
    }

    /// Register a tool, replacing any with the same name.
    pub fn register_tool<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        tracing::debug!(tool = %name, "registered tool");
        self.tools.insert(name, Arc::new(tool));
    }

    /// Register a command, replacing any with the same name.
    pub fn register_command(&mut self, command: Command) {
        self.commands.insert(command.name, command);
    }

    /// Look up a model by id.
    pub fn model(&self, id: &str) -> Result<Arc<dyn Model>> {
        self.models
            .get(id)
            .cloned()
            .ok_or_else(|| PluginError::UnknownModel(id.to_string()))
    }

    /// Look up a tool by name.
    pub fn tool(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| PluginError::UnknownTool(name.to_string()))
    }

    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Registered models, sorted by id.
    pub fn models(&self) -> impl Iterator<Item = &Arc<dyn Model>> {
        self.models.values()
    }

    /// Registered tools, sorted by name.
    pub fn tools(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.values()
    }

    /// Registered commands, sorted by name.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }
}

/// Plugin entry point.
///
/// Registers the `devin` model, the `ask_question` tool, and the `devin`
/// command. The model resolves its API key when it runs, so registration
/// succeeds without credentials.
pub fn register(registry: &mut PluginRegistry, config: &DevinConfig) {
    registry.register_model(DevinModel::new(config.clone()));
    registry.register_tool(DeepWikiTool::new(config.deepwiki("")));
    registry.register_command(Command {
        name: "devin",
        about: "Say hello from Devin",
        run: crate::greeting,
    });
}
