//! llm-devin - Devin sessions and DeepWiki questions from the command line
//!
//! Main entry point for the `llm-devin` CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use llm_devin::DevinConfig;

mod commands;

use commands::{ask, devin, models, prompt, tools};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// llm-devin - Devin sessions and DeepWiki questions
#[derive(Parser)]
#[command(name = "llm-devin")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: <config dir>/config.toml)
    #[arg(long, global = true, env = "LLM_DEVIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Devin API key (default: DEVIN_API_KEY, then the config file)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Say hello from Devin
    Devin(devin::DevinArgs),

    /// Run a prompt as a Devin session
    Prompt(prompt::PromptArgs),

    /// Ask DeepWiki about a repository
    Ask(ask::AskArgs),

    /// List available models
    Models(models::ModelsArgs),

    /// List available tools
    Tools(tools::ToolsArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = llm_devin::logging::init(cli.verbose, "llm-devin.log");

    let config = DevinConfig::load(cli.config.as_deref())?;

    let ctx = commands::Context {
        config,
        api_key: cli.api_key,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Devin(args) => devin::run(args, &ctx).await,
        Commands::Prompt(args) => prompt::run(args, &ctx).await,
        Commands::Ask(args) => ask::run(args, &ctx).await,
        Commands::Models(args) => models::run(args, &ctx).await,
        Commands::Tools(args) => tools::run(args, &ctx).await,
    }
}
