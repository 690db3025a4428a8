//! tfs - Terraform version switcher
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tfs::cli::commands;
use tfs::cli::{Cli, Commands};
use tfs::config::ConfigManager;
use tfs::error::TfsResult;
use tfs::ui;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> TfsResult<()> {
    let cli = Cli::parse();

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("tfs=warn"),
        1 => EnvFilter::new("tfs=info"),
        _ => EnvFilter::new("tfs=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    ui::init_theme();

    let manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    debug!(path = %manager.path().display(), "Using configuration file");

    // Config subcommands load (or skip) the file themselves
    if let Some(Commands::Config(args)) = cli.command {
        return commands::config(args, &manager).await;
    }

    let config = manager.load().await?;

    match cli.command {
        None => commands::use_version(cli.constraint, &config).await,
        Some(Commands::List(args)) => commands::list(args, &config).await,
        Some(Commands::Prune(args)) => commands::prune(args, &config).await,
        Some(Commands::PruneUntil(args)) => commands::prune_until(args, &config).await,
        Some(Commands::Config(_)) => unreachable!("Config handled above"),
    }
}
