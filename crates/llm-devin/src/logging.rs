//! Tracing setup shared by the binaries.
//!
//! Console output (human-readable, stderr) plus a daily rotating JSON file
//! under `<config dir>/logs`.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const VERBOSE_FILTER: &str = "llm_devin=debug,ask_deepwiki=debug,devin_client=debug,devin_mcp=debug,info";
const DEFAULT_FILTER: &str = "llm_devin=info,ask_deepwiki=info,devin_client=info,devin_mcp=info,warn";
const FILE_FILTER: &str = "llm_devin=trace,ask_deepwiki=trace,devin_client=trace,devin_mcp=trace,info";

/// Install the global subscriber.
///
/// `RUST_LOG` replaces the console filter when set. The returned guard must
/// stay alive for the file writer to flush.
pub fn init(verbose: bool, file_name: &str) -> WorkerGuard {
    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER })
    });

    let file_appender = tracing_appender::rolling::daily(log_dir(), file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(console_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new(FILE_FILTER)),
        )
        .init();

    guard
}

fn log_dir() -> PathBuf {
    crate::config::config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}
