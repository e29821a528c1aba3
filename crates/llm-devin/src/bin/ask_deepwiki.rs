//! ask-deepwiki - interactive DeepWiki client
//!
//! Connects to the DeepWiki MCP server, asks one question about a repository,
//! and prints the answer.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Parser;
use console::Style;
use devin_mcp::{ASK_QUESTION_TOOL, McpClient, McpServerConfig};
use llm_devin::DevinConfig;
use serde_json::json;

/// Ask DeepWiki a question about a GitHub repository
#[derive(Parser)]
#[command(name = "ask-deepwiki")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// GitHub repository in owner/repo format
    repository: String,

    /// Question to ask instead of prompting for one
    #[arg(short, long)]
    question: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Config file (default: <config dir>/config.toml)
    #[arg(long, env = "LLM_DEVIN_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = llm_devin::logging::init(cli.verbose, "ask-deepwiki.log");
    let config = DevinConfig::load(cli.config.as_deref())?;

    let dim = Style::new().dim();
    let red = Style::new().red();

    let connect_timeout = Duration::from_secs(config.deepwiki.connect_timeout_secs);
    let server =
        McpServerConfig::new("deepwiki", &config.deepwiki.url).with_timeout(connect_timeout);

    println!(
        "{}",
        dim.apply_to(format!("Connecting to DeepWiki MCP server at {}...", server.url))
    );

    let mut client = match connect(&server, connect_timeout).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{} {:#}", red.apply_to("Failed to connect:"), e);
            return Ok(ExitCode::FAILURE);
        }
    };
    println!("{}", dim.apply_to("Connected to DeepWiki MCP server"));

    let question = match cli.question {
        Some(question) => question,
        None => match read_question().await {
            Ok(question) => question,
            Err(e) => {
                close(&mut client).await;
                return Err(e);
            }
        },
    };

    println!();
    println!("{}", dim.apply_to(format!("Repository: {}", cli.repository)));
    println!("{}", dim.apply_to(format!("Question: {}", question)));

    let arguments = json!({"repoName": cli.repository, "question": question});
    let call_timeout = Duration::from_secs(config.deepwiki.call_timeout_secs);
    let result = tokio::time::timeout(
        call_timeout,
        client.call_tool(ASK_QUESTION_TOOL, Some(arguments)),
    )
    .await;

    close(&mut client).await;

    match result {
        Ok(Ok(output)) => {
            println!();
            println!("{}", Style::new().bold().apply_to("Answer:"));
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Ok(Err(e)) => {
            eprintln!("{} {}", red.apply_to("Failed to call ask_question tool:"), e);
            Ok(ExitCode::FAILURE)
        }
        Err(_) => {
            eprintln!(
                "{} timed out after {:?}",
                red.apply_to("Failed to call ask_question tool:"),
                call_timeout
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Open the event stream and complete the handshake.
async fn connect(server: &McpServerConfig, budget: Duration) -> Result<McpClient> {
    let handshake = async {
        let mut client = McpClient::connect_sse(server).await?;
        let info = client.initialize().await?;
        tracing::info!(server = %info.name, version = %info.version, "MCP session initialized");
        Ok::<_, devin_mcp::McpError>(client)
    };

    tokio::time::timeout(budget, handshake)
        .await
        .map_err(|_| devin_mcp::McpError::Timeout(budget))?
        .context("MCP handshake failed")
}

async fn close(client: &mut McpClient) {
    if let Err(e) = client.shutdown().await {
        tracing::debug!(error = %e, "error closing DeepWiki connection");
    }
}

/// Prompt for the question on the terminal.
async fn read_question() -> Result<String> {
    tokio::task::spawn_blocking(|| -> Result<String> {
        let mut editor = rustyline::DefaultEditor::new()?;
        let line = editor.readline("Ask: ")?;
        Ok(line.trim().to_string())
    })
    .await?
}
