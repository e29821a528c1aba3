//! Tools command - list registered tools.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::Context;

/// Arguments for the tools command.
#[derive(Args, Debug)]
pub struct ToolsArgs {
    /// Show each tool's parameter schema
    #[arg(long)]
    pub schema: bool,
}

/// Run the tools command.
pub async fn run(args: ToolsArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.registry();
    let bold = Style::new().bold();
    let dim = Style::new().dim();

    for tool in registry.tools() {
        println!("{}", bold.apply_to(tool.name()));
        println!("  {}", dim.apply_to(tool.description()));
        if args.schema {
            println!("{}", serde_json::to_string_pretty(&tool.parameters())?);
        }
    }
    Ok(())
}
