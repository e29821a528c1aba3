//! Models command - list registered models.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::Context;

/// Arguments for the models command.
#[derive(Args, Debug)]
pub struct ModelsArgs {}

/// Run the models command.
pub async fn run(_args: ModelsArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.registry();
    let dim = Style::new().dim();

    for model in registry.models() {
        let streaming = if model.can_stream() { "streaming" } else { "" };
        println!("{} {}", model.model_id(), dim.apply_to(streaming));
    }
    Ok(())
}
