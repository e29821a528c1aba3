//! MCP client for communicating with MCP servers.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{McpError, Result};
use crate::protocol::{
    CallToolParams, InitializeParams, InitializeResult, JsonRpcNotification, JsonRpcRequest,
    ListToolsResult, ServerInfo, ToolInfo, ToolOutput,
};
use crate::transport::{McpTransport, SseTransport, SseTransportConfig};

/// Configuration for an MCP server connection.
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Unique name for this server.
    pub name: String,
    /// URL of the server's SSE endpoint.
    pub url: String,
    /// HTTP headers sent with every request.
    pub headers: Vec<(String, String)>,
    /// Connect timeout.
    pub timeout: Option<Duration>,
}

impl McpServerConfig {
    /// Create a new server config.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    /// Add an HTTP header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Set the connect timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn transport_config(&self) -> SseTransportConfig {
        let mut config = SseTransportConfig::new(&self.url);
        if let Some(timeout) = self.timeout {
            config = config.with_connect_timeout(timeout);
        }
        for (key, value) in &self.headers {
            config = config.with_header(key, value);
        }
        config
    }
}

/// An MCP client connected to a single MCP server.
pub struct McpClient {
    /// Server name, for logging.
    name: String,
    /// Transport for communicating with the server.
    transport: Box<dyn McpTransport>,
    /// Server info (after initialization).
    server_info: Option<ServerInfo>,
    /// Next JSON-RPC request id.
    next_id: u64,
}

impl McpClient {
    /// Wrap an already-connected transport.
    ///
    /// This does NOT initialize the connection - call `initialize()` next.
    pub fn new(name: impl Into<String>, transport: Box<dyn McpTransport>) -> Self {
        Self {
            name: name.into(),
            transport,
            server_info: None,
            next_id: 1,
        }
    }

    /// Connect to an MCP server using the SSE transport.
    ///
    /// This opens the event stream but does NOT initialize the connection.
    pub async fn connect_sse(config: &McpServerConfig) -> Result<Self> {
        let transport = SseTransport::connect(config.transport_config()).await?;

        tracing::info!(
            server = %config.name,
            url = %config.url,
            "connected to MCP server via SSE"
        );

        Ok(Self::new(config.name.clone(), Box::new(transport)))
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the server info (after initialization).
    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.server_info.as_ref()
    }

    /// Check if the client has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.server_info.is_some()
    }

    /// Send a request and get the result.
    async fn send_request(&mut self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.next_id;
        self.next_id += 1;
        let request = JsonRpcRequest::new(id, method, params);

        let response = self.transport.send_request(&request).await?;

        response
            .into_result()
            .map_err(|e| McpError::server_error(e.code, e.message, e.data))
    }

    /// Send a notification (no response expected).
    async fn send_notification(&mut self, method: &str, params: Option<Value>) -> Result<()> {
        let notification = JsonRpcNotification::new(method, params);
        self.transport.send_notification(&notification).await
    }

    /// Initialize the connection with the MCP server.
    ///
    /// Performs the handshake, exchanging capabilities and protocol versions.
    /// Must be called before using other methods.
    pub async fn initialize(&mut self) -> Result<&ServerInfo> {
        if self.server_info.is_some() {
            return self.server_info.as_ref().ok_or(McpError::NotInitialized);
        }

        let params = InitializeParams::default();
        let result = self
            .send_request("initialize", Some(serde_json::to_value(&params)?))
            .await?;

        let init_result: InitializeResult = serde_json::from_value(result)?;

        tracing::info!(
            server = %init_result.server_info.name,
            version = %init_result.server_info.version,
            protocol = %init_result.protocol_version,
            "MCP server initialized"
        );

        self.send_notification("notifications/initialized", None)
            .await?;

        Ok(self.server_info.insert(init_result.server_info))
    }

    /// List available tools from the server.
    pub async fn list_tools(&mut self) -> Result<Vec<ToolInfo>> {
        if !self.is_initialized() {
            return Err(McpError::NotInitialized);
        }

        let result = self.send_request("tools/list", None).await?;
        let list_result: ListToolsResult = serde_json::from_value(result)?;

        tracing::debug!(
            server = %self.name,
            tool_count = list_result.tools.len(),
            "listed MCP tools"
        );

        Ok(list_result.tools)
    }

    /// Call a tool on the server.
    pub async fn call_tool(&mut self, name: &str, arguments: Option<Value>) -> Result<ToolOutput> {
        if !self.is_initialized() {
            return Err(McpError::NotInitialized);
        }

        let params = CallToolParams {
            name: name.to_string(),
            arguments,
        };

        let result = self
            .send_request("tools/call", Some(serde_json::to_value(&params)?))
            .await?;
        let output = ToolOutput::from_value(result);

        if output.is_error() {
            tracing::warn!(server = %self.name, tool = %name, "tool call returned error");
        } else {
            tracing::debug!(server = %self.name, tool = %name, "tool call succeeded");
        }

        Ok(output)
    }

    /// Shut the connection down.
    pub async fn shutdown(&mut self) -> Result<()> {
        tracing::debug!(server = %self.name, "shutting down MCP client");
        self.transport.shutdown().await
    }
}

/// Opens connections to MCP servers.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to the configured server. The returned client is not yet initialized.
    async fn connect(&self, config: &McpServerConfig) -> Result<McpClient>;
}

/// Connects over HTTP+SSE.
#[derive(Debug, Clone, Copy, Default)]
pub struct SseConnector;

#[async_trait]
impl Connector for SseConnector {
    async fn connect(&self, config: &McpServerConfig) -> Result<McpClient> {
        McpClient::connect_sse(config).await
    }
}
