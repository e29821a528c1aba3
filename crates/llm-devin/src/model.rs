//! The `devin` model: each prompt becomes a Devin session.

use async_trait::async_trait;
use devin_client::CreateSessionRequest;
use tokio_util::sync::CancellationToken;

use crate::config::DevinConfig;
use crate::error::{PluginError, Result};
use crate::plugin::{Model, ModelResponse};

/// Model id users select.
pub const MODEL_ID: &str = "devin";

/// Runs prompts as Devin sessions and streams the agent's messages.
///
/// The session is created inside [`Model::execute`]; the returned stream
/// polls until the session is terminal and then yields each message.
#[derive(Debug, Clone)]
pub struct DevinModel {
    config: DevinConfig,
    api_key: Option<String>,
}

impl DevinModel {
    pub fn new(config: DevinConfig) -> Self {
        Self {
            config,
            api_key: None,
        }
    }

    /// Use this key instead of the environment or config file.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

#[async_trait]
impl Model for DevinModel {
    fn model_id(&self) -> &str {
        MODEL_ID
    }

    fn can_stream(&self) -> bool {
        true
    }

    async fn execute(&self, prompt: &str, cancel: CancellationToken) -> Result<ModelResponse> {
        let client = self.config.devin_client(self.api_key.as_deref())?;
        let sessions = client.sessions();

        let request =
            CreateSessionRequest::new(prompt).with_idempotent(self.config.api.idempotent);
        let handle = sessions.create(request).await?;
        let url = handle.url.clone();
        let options = self.config.poll_options();

        let stream = async_stream::try_stream! {
            let state = sessions
                .poll_until_terminal(&handle, &options, &cancel)
                .await
                .map_err(PluginError::from)?;
            for message in state.into_devin_messages() {
                yield message;
            }
        };

        Ok(ModelResponse {
            url,
            stream: Box::pin(stream),
        })
    }
}
