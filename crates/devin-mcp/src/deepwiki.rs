//! DeepWiki documentation Q&A over MCP.
//!
//! Each question opens its own connection, runs the handshake, calls
//! `ask_question`, and closes the connection again. Failures never escape as
//! errors: [`DeepWiki::ask_question`] renders them into the answer string so
//! callers can show them verbatim.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;

use crate::client::{Connector, McpClient, McpServerConfig, SseConnector};
use crate::error::{McpError, Result};
use crate::protocol::ToolOutput;

/// Public DeepWiki MCP server.
pub const DEEPWIKI_SSE_URL: &str = "https://mcp.deepwiki.com/sse";

/// Name of the DeepWiki question tool.
pub const ASK_QUESTION_TOOL: &str = "ask_question";

/// Prefix of every rendered failure.
pub const CONNECT_ERROR_PREFIX: &str = "Error connecting to DeepWiki MCP server: ";

/// Budget for connecting and completing the handshake, together.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Budget for the tool call itself.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(300);

/// Asks DeepWiki questions about one repository.
#[derive(Clone)]
pub struct DeepWiki {
    repository: String,
    server_url: String,
    connect_timeout: Duration,
    call_timeout: Duration,
    connector: Arc<dyn Connector>,
}

impl std::fmt::Debug for DeepWiki {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepWiki")
            .field("repository", &self.repository)
            .field("server_url", &self.server_url)
            .field("connect_timeout", &self.connect_timeout)
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

impl DeepWiki {
    /// Create a client for `owner/repo` against the public server.
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            server_url: DEEPWIKI_SSE_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            connector: Arc::new(SseConnector),
        }
    }

    /// Use a different server.
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    /// Set the connect + handshake budget.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the tool call budget.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Replace how connections are opened.
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    /// Repository questions are asked about.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Server SSE URL.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Ask a question and return the rendered answer.
    ///
    /// Any failure is rendered as `Error connecting to DeepWiki MCP server: <cause>`.
    pub async fn ask_question(&self, question: &str) -> String {
        self.ask_question_in(&self.repository, question).await
    }

    /// Like [`DeepWiki::ask_question`] but for another repository.
    pub async fn ask_question_in(&self, repository: &str, question: &str) -> String {
        match self.try_ask_in(repository, question).await {
            Ok(output) => output.render(),
            Err(e) => {
                tracing::warn!(repository, error = %e, "DeepWiki question failed");
                format!("{}{}", CONNECT_ERROR_PREFIX, e)
            }
        }
    }

    /// Ask a question, returning the raw tool output or the failure.
    pub async fn try_ask(&self, question: &str) -> Result<ToolOutput> {
        self.try_ask_in(&self.repository, question).await
    }

    async fn try_ask_in(&self, repository: &str, question: &str) -> Result<ToolOutput> {
        let config =
            McpServerConfig::new("deepwiki", &self.server_url).with_timeout(self.connect_timeout);

        // Connect and handshake share one budget.
        let setup_deadline = Instant::now() + self.connect_timeout;

        tracing::debug!(url = %self.server_url, repository, "connecting to DeepWiki");
        let mut client = before(
            setup_deadline,
            self.connect_timeout,
            self.connector.connect(&config),
        )
        .await?;

        let result = self
            .ask_with(&mut client, setup_deadline, repository, question)
            .await;

        if let Err(e) = client.shutdown().await {
            tracing::debug!(error = %e, "error closing DeepWiki connection");
        }
        result
    }

    async fn ask_with(
        &self,
        client: &mut McpClient,
        setup_deadline: Instant,
        repository: &str,
        question: &str,
    ) -> Result<ToolOutput> {
        before(setup_deadline, self.connect_timeout, client.initialize()).await?;

        let arguments = json!({"repoName": repository, "question": question});
        tracing::info!(repository, tool = ASK_QUESTION_TOOL, "calling DeepWiki");

        before(
            Instant::now() + self.call_timeout,
            self.call_timeout,
            client.call_tool(ASK_QUESTION_TOOL, Some(arguments)),
        )
        .await
    }
}

/// Run `fut` until `deadline`; `budget` is the span reported on timeout.
async fn before<T>(
    deadline: Instant,
    budget: Duration,
    fut: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout_at(deadline, fut)
        .await
        .map_err(|_| McpError::Timeout(budget))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_public_server() {
        let deepwiki = DeepWiki::new("test/repo");
        assert_eq!(deepwiki.repository(), "test/repo");
        assert_eq!(deepwiki.server_url(), "https://mcp.deepwiki.com/sse");
    }

    #[test]
    fn test_builder_overrides() {
        let deepwiki = DeepWiki::new("a/b")
            .with_server_url("http://localhost:1/sse")
            .with_connect_timeout(Duration::from_secs(1))
            .with_call_timeout(Duration::from_secs(2));
        assert_eq!(deepwiki.server_url(), "http://localhost:1/sse");
        assert_eq!(deepwiki.connect_timeout, Duration::from_secs(1));
        assert_eq!(deepwiki.call_timeout, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_unreachable_server_renders_prefix() {
        let deepwiki = DeepWiki::new("a/b")
            .with_server_url("not a url")
            .with_connect_timeout(Duration::from_secs(1));
        let answer = deepwiki.ask_question("anything").await;
        assert!(answer.starts_with(CONNECT_ERROR_PREFIX));
        assert!(answer.contains("invalid URL"));
    }
}
