//! Devin command - greeting.

use anyhow::{Result, anyhow};
use clap::Args;

use super::Context;

/// Arguments for the devin command.
#[derive(Args, Debug)]
pub struct DevinArgs {
    /// Who to greet
    pub name: String,
}

/// Run the devin command.
pub async fn run(args: DevinArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.registry();
    let command = registry
        .command("devin")
        .ok_or_else(|| anyhow!("devin command not registered"))?;
    println!("{}", (command.run)(&args.name));
    Ok(())
}
