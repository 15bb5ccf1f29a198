// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use launchpad_core::domain::config::LaunchpadConfigManifest;
use launchpad_core::infrastructure::DeployerRegistry;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./launchpad-config.yaml)
        #[arg(short, long, default_value = "./launchpad-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = LaunchpadConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. LAUNCHPAD_CONFIG_PATH: {}",
            std::env::var("LAUNCHPAD_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./launchpad-config.yaml");
        println!("  4. ~/.launchpad/config.yaml");
        println!("  5. /etc/launchpad/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Git:".bold());
    println!("  Cache dir: {}", config.spec.git.cache_dir.display());
    println!("  History depth: {}", config.spec.git.history_depth);
    println!();

    println!("{}", "Deployers:".bold());
    let registry = DeployerRegistry::from_config(&config);
    for deploy_type in registry.registered_types() {
        println!("  {}", deploy_type.as_str().bold());
    }
    let shell = &config.spec.deployers.shell;
    println!(
        "  shell: {} in {} (timeout {}s)",
        shell.script,
        shell.workspace_dir.display(),
        shell.timeout_secs
    );
    if let Some(ci) = &config.spec.deployers.ci {
        println!("  ci: {}", ci.endpoint);
    }
    println!();

    println!("{}", "Projects:".bold());
    if config.spec.projects.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for project in &config.spec.projects {
        println!(
            "  {} ({}) → {}",
            project.name.as_str().bold(),
            project.deploy_type,
            project.repo_url
        );
    }
    println!();

    println!("{}", "Logging:".bold());
    println!("  Level: {}", config.spec.logging.level);

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = LaunchpadConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}
