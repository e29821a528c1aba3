//! Ask command - one-shot DeepWiki question.

use anyhow::Result;
use clap::Args;
use console::Style;
use devin_mcp::ASK_QUESTION_TOOL;
use serde_json::json;

use super::Context;

/// Arguments for the ask command.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// GitHub repository in owner/repo format
    pub repository: String,

    /// The question to ask
    pub question: String,
}

/// Run the ask command.
pub async fn run(args: AskArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.registry();
    let tool = registry.tool(ASK_QUESTION_TOOL)?;

    if ctx.verbose {
        let dim = Style::new().dim();
        eprintln!(
            "{}",
            dim.apply_to(format!("Asking {} via {}", args.repository, ctx.config.deepwiki.url))
        );
    }

    let answer = tool
        .call(json!({"repoName": args.repository, "question": args.question}))
        .await?;
    println!("{}", answer);
    Ok(())
}
