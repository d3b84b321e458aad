//! Evalbench CLI application
//!
//! Runs benchmark suites against the models of `models/registry.yml` and
//! aggregates recorded runs into a leaderboard.
//!
//! # Commands
//!
//! - `evalbench run --model mock --suite programming_general`
//! - `evalbench matrix --suite data_programming --models mock gpt-4o-mini --aggregate`
//! - `evalbench aggregate`
//! - `evalbench list models` / `evalbench list suites`
//!
//! Set `RUST_LOG=debug` for per-case logging.

mod args;
mod commands;
mod console;
mod router;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::{Cli, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    // Provider keys may live in <root>/.env; variables already set win
    match dotenvy::from_path(cli.root.join(".env")) {
        Ok(()) => tracing::debug!("Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Failed to load .env"),
    }

    router::route(cli).await
}

/// Initialize logging with environment-based filtering, `info` by default
fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
