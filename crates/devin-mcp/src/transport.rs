//! Transport layer for MCP communication.
//!
//! Remote servers speak the HTTP+SSE transport: the client holds a
//! long-lived `GET` event stream open and sends every JSON-RPC message as a
//! separate `POST` to the endpoint announced on that stream. Responses come
//! back on the stream, not in the `POST` reply.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::{Stream, StreamExt};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use crate::error::{McpError, Result};
use crate::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

/// SSE event announcing the message endpoint.
const ENDPOINT_EVENT: &str = "endpoint";

/// SSE event carrying a JSON-RPC message.
const MESSAGE_EVENT: &str = "message";

type EventStream =
    Pin<Box<dyn Stream<Item = std::result::Result<Event, EventStreamError<reqwest::Error>>> + Send>>;

/// A channel to one MCP server.
#[async_trait]
pub trait McpTransport: Send {
    /// Send a JSON-RPC request and wait for the matching response.
    async fn send_request(&mut self, request: &JsonRpcRequest) -> Result<JsonRpcResponse>;

    /// Send a JSON-RPC notification (no response expected).
    async fn send_notification(&mut self, notification: &JsonRpcNotification) -> Result<()>;

    /// Release the connection.
    async fn shutdown(&mut self) -> Result<()>;
}

/// Configuration for the SSE transport.
#[derive(Debug, Clone)]
pub struct SseTransportConfig {
    /// URL of the server's SSE endpoint.
    pub url: String,
    /// Timeout for establishing TCP/TLS connections.
    pub connect_timeout: Duration,
    /// Extra headers sent with every request.
    pub headers: Vec<(String, String)>,
}

impl Default for SseTransportConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_timeout: Duration::from_secs(60),
            headers: Vec::new(),
        }
    }
}

impl SseTransportConfig {
    /// Create a new SSE transport config with the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Add a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// HTTP+SSE transport.
pub struct SseTransport {
    http: reqwest::Client,
    config: SseTransportConfig,
    /// Where JSON-RPC messages are POSTed.
    endpoint: Url,
    /// Open event stream; `None` after shutdown.
    events: Option<EventStream>,
}

impl SseTransport {
    /// Open the event stream and wait for the server to announce its endpoint.
    pub async fn connect(config: SseTransportConfig) -> Result<Self> {
        let sse_url = Url::parse(&config.url)
            .map_err(|e| McpError::transport(format!("invalid URL: {}", e)))?;

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        let mut request = http.get(sse_url.clone()).header(ACCEPT, "text/event-stream");
        for (key, value) in &config.headers {
            request = request.header(key, value);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(McpError::transport(format!(
                "HTTP error {} opening event stream",
                response.status()
            )));
        }

        let mut events: EventStream = Box::pin(response.bytes_stream().eventsource());
        let endpoint = Self::wait_for_endpoint(&mut events, &sse_url).await?;

        tracing::info!(
            url = %sse_url,
            endpoint = %endpoint,
            "opened MCP event stream"
        );

        Ok(Self {
            http,
            config,
            endpoint,
            events: Some(events),
        })
    }

    /// The URL JSON-RPC messages are POSTed to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Check if the event stream is still held open.
    pub fn is_connected(&self) -> bool {
        self.events.is_some()
    }

    async fn wait_for_endpoint(events: &mut EventStream, sse_url: &Url) -> Result<Url> {
        loop {
            let event = next_event(events).await?;
            if event.event != ENDPOINT_EVENT {
                tracing::trace!(event = %event.event, "skipping event before endpoint");
                continue;
            }

            let endpoint = sse_url
                .join(event.data.trim())
                .map_err(|e| McpError::protocol(format!("invalid endpoint URL: {}", e)))?;

            if endpoint.origin() != sse_url.origin() {
                return Err(McpError::protocol(format!(
                    "endpoint origin does not match server: {}",
                    endpoint
                )));
            }

            return Ok(endpoint);
        }
    }

    /// POST one JSON-RPC message to the endpoint.
    async fn post(&mut self, body: String) -> Result<()> {
        let mut request = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        for (key, value) in &self.config.headers {
            request = request.header(key, value);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(McpError::transport(format!("HTTP error {}: {}", status, body)));
        }
        Ok(())
    }

    fn events(&mut self) -> Result<&mut EventStream> {
        self.events.as_mut().ok_or(McpError::ConnectionClosed)
    }
}

#[async_trait]
impl McpTransport for SseTransport {
    async fn send_request(&mut self, request: &JsonRpcRequest) -> Result<JsonRpcResponse> {
        let json = serde_json::to_string(request)?;
        tracing::trace!(json = %json, "sending MCP request");
        self.post(json).await?;

        let events = self.events()?;
        loop {
            let event = next_event(events).await?;
            if !event.event.is_empty() && event.event != MESSAGE_EVENT {
                tracing::trace!(event = %event.event, "skipping non-message event");
                continue;
            }

            let message: Value = serde_json::from_str(&event.data)?;
            if message.get("method").is_some() {
                tracing::debug!(
                    method = %message["method"],
                    "ignoring server-initiated message"
                );
                continue;
            }
            if message.get("id").and_then(Value::as_u64) != Some(request.id) {
                tracing::warn!(expected = request.id, id = %message["id"], "skipping response with unexpected id");
                continue;
            }

            tracing::trace!(json = %event.data, "received MCP response");
            return Ok(serde_json::from_value(message)?);
        }
    }

    async fn send_notification(&mut self, notification: &JsonRpcNotification) -> Result<()> {
        self.events()?;
        let json = serde_json::to_string(notification)?;
        tracing::trace!(json = %json, "sending MCP notification");
        self.post(json).await
    }

    async fn shutdown(&mut self) -> Result<()> {
        if self.events.take().is_some() {
            tracing::debug!(endpoint = %self.endpoint, "closed MCP event stream");
        }
        Ok(())
    }
}

async fn next_event(events: &mut EventStream) -> Result<Event> {
    match events.next().await {
        Some(Ok(event)) => Ok(event),
        Some(Err(e)) => Err(McpError::transport(format!("event stream error: {}", e))),
        None => Err(McpError::ConnectionClosed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sse_transport_config() {
        let config = SseTransportConfig::new("https://mcp.example.com/sse")
            .with_connect_timeout(Duration::from_secs(5))
            .with_header("Authorization", "Bearer token123");

        assert_eq!(config.url, "https://mcp.example.com/sse");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(
            config.headers,
            vec![("Authorization".to_string(), "Bearer token123".to_string())]
        );
    }

    #[test]
    fn test_sse_transport_config_default() {
        let config = SseTransportConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(60));
        assert!(config.headers.is_empty());
    }

    #[tokio::test]
    async fn test_connect_invalid_url() {
        let result = SseTransport::connect(SseTransportConfig::new("not a valid url")).await;
        match result {
            Err(McpError::Transport(msg)) => assert!(msg.contains("invalid URL")),
            Err(other) => panic!("expected Transport error, got {other:?}"),
            Ok(_) => panic!("expected Transport error"),
        }
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Port 9 (discard) is almost never listening locally.
        let result = SseTransport::connect(
            SseTransportConfig::new("http://127.0.0.1:9/sse")
                .with_connect_timeout(Duration::from_secs(2)),
        )
        .await;
        assert!(matches!(result, Err(McpError::Transport(_))));
    }
}
