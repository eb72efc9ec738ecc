//! csv2zaim - Import card statement CSV exports into Zaim
//!
//! Usage:
//!   csv2zaim statement.csv                    Import every new row
//!   csv2zaim statement.csv --dry-run          Show what would be submitted
//!   csv2zaim statement.csv --infer-category   Reuse categories of recurring merchants

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    commands::cmd_import(&cli).await
}
