//! Prompt command - run a prompt through a model and stream the output.

use anyhow::Result;
use clap::Args;
use console::Style;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use super::Context;

/// Arguments for the prompt command.
#[derive(Args, Debug)]
pub struct PromptArgs {
    /// The prompt to send
    pub prompt: String,

    /// Model to run the prompt with
    #[arg(short, long, default_value = "devin")]
    pub model: String,
}

/// Run the prompt command.
pub async fn run(args: PromptArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.registry();
    let model = registry.model(&args.model)?;
    let dim = Style::new().dim();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, cancelling session polling");
            on_interrupt.cancel();
        }
    });

    let mut response = model.execute(&args.prompt, cancel.clone()).await?;

    if let Some(url) = &response.url {
        eprintln!("{}", dim.apply_to(format!("Session: {}", url)));
    }
    if ctx.verbose {
        eprintln!(
            "{}",
            dim.apply_to(format!(
                "Polling every {}s...",
                ctx.config.poll.interval_secs
            ))
        );
    }

    let mut result = Ok(());
    while let Some(chunk) = response.stream.next().await {
        match chunk {
            Ok(text) => println!("{}", text),
            Err(e) => {
                result = Err(e.into());
                break;
            }
        }
    }

    cancel.cancel();
    result
}
