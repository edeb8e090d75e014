//! CLI entry point for the notebridge tool.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

mod cli;
mod commands;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let repository = commands::build_repository(&args)?;

    match &args.command {
        Command::Auth => commands::auth_check(&repository).await,
        Command::Notebooks { command } => commands::notebooks(&repository, command).await,
        Command::Sources { command } => commands::sources(&repository, command).await,
        Command::Push(push) => commands::push(&repository, push).await,
        Command::Export(export) => commands::export(&repository, export).await,
    }
}
