//! DeepWiki adapter tests with scripted connections.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use devin_mcp::{
    CONNECT_ERROR_PREFIX, Connector, DeepWiki, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, McpClient, McpError, McpServerConfig, McpTransport, Result,
};
use serde_json::{Value, json};

/// What the scripted server does for each request, in order.
enum Step {
    Reply(Value),
    SlowReply(Duration, Value),
    Fail(&'static str),
    Hang,
}

struct ScriptedTransport {
    steps: Vec<Step>,
    requests: Arc<Mutex<Vec<JsonRpcRequest>>>,
    shut_down: Arc<AtomicBool>,
}

#[async_trait]
impl McpTransport for ScriptedTransport {
    async fn send_request(&mut self, request: &JsonRpcRequest) -> Result<JsonRpcResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if self.steps.is_empty() {
            return Err(McpError::ConnectionClosed);
        }
        match self.steps.remove(0) {
            Step::Reply(result) => Ok(JsonRpcResponse::success(request.id, result)),
            Step::SlowReply(delay, result) => {
                tokio::time::sleep(delay).await;
                Ok(JsonRpcResponse::success(request.id, result))
            }
            Step::Fail(message) => Err(McpError::transport(message)),
            Step::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(McpError::ConnectionClosed)
            }
        }
    }

    async fn send_notification(&mut self, _: &JsonRpcNotification) -> Result<()> {
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.shut_down.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out one scripted connection.
struct ScriptedConnector {
    connect_delay: Duration,
    transport: Mutex<Option<ScriptedTransport>>,
    requests: Arc<Mutex<Vec<JsonRpcRequest>>>,
    shut_down: Arc<AtomicBool>,
}

impl ScriptedConnector {
    fn new(steps: Vec<Step>) -> Arc<Self> {
        Self::slow(Duration::ZERO, steps)
    }

    /// Takes `connect_delay` to hand out the connection.
    fn slow(connect_delay: Duration, steps: Vec<Step>) -> Arc<Self> {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let shut_down = Arc::new(AtomicBool::new(false));
        Arc::new(Self {
            connect_delay,
            transport: Mutex::new(Some(ScriptedTransport {
                steps,
                requests: requests.clone(),
                shut_down: shut_down.clone(),
            })),
            requests,
            shut_down,
        })
    }

    fn tool_calls(&self) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == "tools/call")
            .filter_map(|r| r.params.clone())
            .collect()
    }

    fn was_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, config: &McpServerConfig) -> Result<McpClient> {
        tokio::time::sleep(self.connect_delay).await;
        let transport = self
            .transport
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| McpError::transport("already connected"))?;
        Ok(McpClient::new(config.name.clone(), Box::new(transport)))
    }
}

/// Fails before any connection exists.
struct FailingConnector(&'static str);

#[async_trait]
impl Connector for FailingConnector {
    async fn connect(&self, _: &McpServerConfig) -> Result<McpClient> {
        Err(McpError::transport(self.0))
    }
}

fn init_result() -> Value {
    json!({
        "protocolVersion": "2024-11-05",
        "capabilities": {"tools": {}},
        "serverInfo": {"name": "DeepWiki", "version": "0.0.1"}
    })
}

fn deepwiki(connector: Arc<dyn Connector>) -> DeepWiki {
    DeepWiki::new("owner/repo").with_connector(connector)
}

#[tokio::test]
async fn test_ask_question_success() {
    let connector = ScriptedConnector::new(vec![
        Step::Reply(init_result()),
        Step::Reply(json!({
            "content": [{"type": "text", "text": "This repository is a Python library for testing."}]
        })),
    ]);

    let answer = deepwiki(connector.clone())
        .ask_question("What is this repository about?")
        .await;

    assert_eq!(answer, "This repository is a Python library for testing.");
    assert_eq!(
        connector.tool_calls(),
        vec![json!({
            "name": "ask_question",
            "arguments": {"repoName": "owner/repo", "question": "What is this repository about?"}
        })]
    );
    assert!(connector.was_shut_down());
}

#[tokio::test]
async fn test_ask_question_multiple_content() {
    let connector = ScriptedConnector::new(vec![
        Step::Reply(init_result()),
        Step::Reply(json!({
            "content": [
                {"type": "text", "text": "Part 1"},
                {"type": "text", "text": "Part 2"}
            ]
        })),
    ]);

    let answer = deepwiki(connector).ask_question("Tell me more").await;
    assert_eq!(answer, "Part 1\nPart 2");
}

#[tokio::test]
async fn test_ask_question_without_content() {
    let connector = ScriptedConnector::new(vec![
        Step::Reply(init_result()),
        Step::Reply(json!("Simple string result")),
    ]);

    let answer = deepwiki(connector).ask_question("Simple question").await;
    assert_eq!(answer, "Simple string result");
}

#[tokio::test]
async fn test_ask_question_non_text_content() {
    let connector = ScriptedConnector::new(vec![
        Step::Reply(init_result()),
        Step::Reply(json!({
            "content": [
                {"type": "text", "text": "Text content"},
                {"type": "image", "data": "aW1n", "mimeType": "image/png"}
            ]
        })),
    ]);

    let answer = deepwiki(connector).ask_question("Mixed content question").await;
    assert!(answer.contains("Text content"));
    assert!(answer.contains("image/png"));
}

#[tokio::test]
async fn test_connection_error() {
    let answer = deepwiki(Arc::new(FailingConnector("Connection failed")))
        .ask_question("Any question")
        .await;

    assert_eq!(
        answer,
        "Error connecting to DeepWiki MCP server: Connection failed"
    );
}

#[tokio::test]
async fn test_session_init_error() {
    let connector = ScriptedConnector::new(vec![Step::Fail("Session init failed")]);

    let answer = deepwiki(connector.clone()).ask_question("Any question").await;

    assert_eq!(
        answer,
        "Error connecting to DeepWiki MCP server: Session init failed"
    );
    assert!(connector.tool_calls().is_empty());
    assert!(connector.was_shut_down());
}

#[tokio::test]
async fn test_tool_call_error_still_closes_connection() {
    let connector = ScriptedConnector::new(vec![
        Step::Reply(init_result()),
        Step::Fail("stream reset"),
    ]);

    let answer = deepwiki(connector.clone()).ask_question("q").await;

    assert!(answer.starts_with(CONNECT_ERROR_PREFIX));
    assert!(answer.ends_with("stream reset"));
    assert!(connector.was_shut_down());
}

#[tokio::test]
async fn test_handshake_timeout() {
    let connector = ScriptedConnector::new(vec![Step::Hang]);

    let answer = deepwiki(connector.clone())
        .with_connect_timeout(Duration::from_millis(50))
        .ask_question("q")
        .await;

    assert_eq!(
        answer,
        format!("{}timed out after 50ms", CONNECT_ERROR_PREFIX)
    );
    assert!(connector.was_shut_down());
}

#[tokio::test]
async fn test_connect_and_handshake_share_one_budget() {
    // Each step alone fits the budget; together they do not.
    let connector = ScriptedConnector::slow(
        Duration::from_millis(150),
        vec![
            Step::SlowReply(Duration::from_millis(150), init_result()),
            Step::Reply(json!({"content": [{"type": "text", "text": "too late"}]})),
        ],
    );

    let answer = deepwiki(connector.clone())
        .with_connect_timeout(Duration::from_millis(200))
        .ask_question("q")
        .await;

    assert_eq!(
        answer,
        format!("{}timed out after 200ms", CONNECT_ERROR_PREFIX)
    );
    assert!(connector.tool_calls().is_empty());
    assert!(connector.was_shut_down());
}

#[tokio::test]
async fn test_ask_question_in_other_repository() {
    let connector = ScriptedConnector::new(vec![
        Step::Reply(init_result()),
        Step::Reply(json!({"content": [{"type": "text", "text": "ok"}]})),
    ]);

    let answer = deepwiki(connector.clone())
        .ask_question_in("other/repo", "q")
        .await;

    assert_eq!(answer, "ok");
    assert_eq!(
        connector.tool_calls()[0]["arguments"]["repoName"],
        json!("other/repo")
    );
}
