//! MCP (Model Context Protocol) client over HTTP+SSE.
//!
//! This crate connects to remote MCP servers using the HTTP+SSE transport and
//! wraps the DeepWiki documentation server's `ask_question` tool.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  DeepWiki                                                   │
//! │  - One connection per question, always torn down            │
//! │  - Renders failures as "Error connecting to ..." strings    │
//! └─────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  McpClient                                                  │
//! │  - Implements initialize, tools/list, tools/call            │
//! └─────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  McpTransport (SseTransport)                                │
//! │  - GET <url> opens the event stream                         │
//! │  - `endpoint` event names where to POST JSON-RPC messages   │
//! │  - responses arrive as `message` events                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use devin_mcp::DeepWiki;
//!
//! let deepwiki = DeepWiki::new("tokio-rs/tokio");
//! let answer = deepwiki.ask_question("How does the scheduler steal work?").await;
//! println!("{answer}");
//! ```
//!
//! # Protocol flow
//!
//! 1. Client opens the SSE stream and waits for the `endpoint` event
//! 2. Client sends `initialize` with capabilities
//! 3. Server responds with its capabilities
//! 4. Client sends `notifications/initialized`
//! 5. Client can now call `tools/list` and `tools/call`

pub mod client;
pub mod deepwiki;
pub mod error;
pub mod protocol;
pub mod transport;

// Re-export main types
pub use client::{Connector, McpClient, McpServerConfig, SseConnector};
pub use deepwiki::{
    ASK_QUESTION_TOOL, CONNECT_ERROR_PREFIX, DEEPWIKI_SSE_URL, DeepWiki,
    DEFAULT_CALL_TIMEOUT, DEFAULT_CONNECT_TIMEOUT,
};
pub use error::{McpError, Result};
pub use protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, ListToolsResult, ResourceContents,
    ServerCapabilities, ServerInfo, ToolContent, ToolInfo, ToolOutput, ToolsCapability,
};
pub use transport::{McpTransport, SseTransport, SseTransportConfig};
