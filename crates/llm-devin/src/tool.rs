//! The `ask_question` tool backed by DeepWiki.

use async_trait::async_trait;
use devin_mcp::{ASK_QUESTION_TOOL, DeepWiki};
use serde_json::{Value, json};

use crate::error::{PluginError, Result};
use crate::plugin::Tool;

/// Asks DeepWiki about a GitHub repository.
///
/// Connection and protocol failures come back as the answer text
/// (`Error connecting to DeepWiki MCP server: ...`), never as errors. Only
/// malformed arguments are errors.
#[derive(Debug, Clone)]
pub struct DeepWikiTool {
    deepwiki: DeepWiki,
}

impl DeepWikiTool {
    /// Wrap a DeepWiki client. Its repository, if non-empty, is used when the
    /// arguments omit `repoName`.
    pub fn new(deepwiki: DeepWiki) -> Self {
        Self { deepwiki }
    }
}

#[async_trait]
impl Tool for DeepWikiTool {
    fn name(&self) -> &str {
        ASK_QUESTION_TOOL
    }

    fn description(&self) -> &str {
        "Ask a question about a GitHub repository's documentation via DeepWiki"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repoName": {
                    "type": "string",
                    "description": "GitHub repository in owner/repo format, e.g. \"facebook/react\""
                },
                "question": {
                    "type": "string",
                    "description": "The question to ask about the repository"
                }
            },
            "required": ["repoName", "question"]
        })
    }

    async fn call(&self, args: Value) -> Result<String> {
        let question = string_arg(&args, "question")
            .ok_or_else(|| PluginError::invalid_arguments(ASK_QUESTION_TOOL, "missing 'question'"))?;

        let repository = match string_arg(&args, "repoName") {
            Some(repo) => repo,
            None if !self.deepwiki.repository().is_empty() => self.deepwiki.repository(),
            None => {
                return Err(PluginError::invalid_arguments(
                    ASK_QUESTION_TOOL,
                    "missing 'repoName'",
                ));
            }
        };

        Ok(self.deepwiki.ask_question_in(repository, question).await)
    }
}

fn string_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn unreachable_tool(repository: &str) -> DeepWikiTool {
        // Port 9 (discard) on localhost refuses connections.
        DeepWikiTool::new(
            DeepWiki::new(repository)
                .with_server_url("http://127.0.0.1:9/sse")
                .with_connect_timeout(Duration::from_secs(5)),
        )
    }

    #[test]
    fn test_schema_requires_both_arguments() {
        let params = unreachable_tool("").parameters();
        assert_eq!(params["required"], json!(["repoName", "question"]));
        assert_eq!(params["properties"]["repoName"]["type"], "string");
    }

    #[tokio::test]
    async fn test_missing_question_is_invalid() {
        let err = unreachable_tool("")
            .call(json!({"repoName": "a/b"}))
            .await
            .unwrap_err();
        assert!(matches!(err, PluginError::InvalidArguments { .. }));
        assert!(err.to_string().contains("question"));
    }

    #[tokio::test]
    async fn test_missing_repo_without_default_is_invalid() {
        let err = unreachable_tool("")
            .call(json!({"question": "q"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("repoName"));
    }

    #[tokio::test]
    async fn test_connection_failure_is_rendered() {
        let answer = unreachable_tool("a/b")
            .call(json!({"question": "What is this?"}))
            .await
            .unwrap();
        assert!(answer.starts_with("Error connecting to DeepWiki MCP server: "));
    }
}
