// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Launchpad CLI
//!
//! The `launchpad` binary deploys configured projects from the command line.
//!
//! ## Commands
//!
//! - `launchpad deploy <project>` - Resolve the branch head and dispatch a deploy
//! - `launchpad project list|branches|setup` - Project management
//! - `launchpad config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use launchpad_cli::commands::{self, ConfigCommand, DeployArgs, ProjectCommand};
use launchpad_core::domain::config::LaunchpadConfigManifest;

/// Launchpad - pin a branch to a commit and deploy it
#[derive(Parser)]
#[command(name = "launchpad")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "LAUNCHPAD_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to spec.logging.level
    #[arg(long, global = true, env = "LAUNCHPAD_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a project
    #[command(name = "deploy")]
    Deploy(DeployArgs),

    /// Project management
    #[command(name = "project")]
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match &cli.log_level {
        Some(level) => level.clone(),
        None => LaunchpadConfigManifest::load_or_default(cli.config.clone())
            .map(|config| config.spec.logging.level)
            .unwrap_or_else(|_| "info".to_string()),
    };
    init_logging(&level)?;

    match cli.command {
        Some(Commands::Deploy(args)) => commands::deploy::handle_command(args, cli.config).await,
        Some(Commands::Project { command }) => {
            commands::project::handle_command(command, cli.config).await
        }
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}
