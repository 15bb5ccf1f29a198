// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Project management commands
//!
//! Commands: list, branches, setup

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use launchpad_core::domain::commit::CommitResolver;
use launchpad_core::domain::config::LaunchpadConfigManifest;
use launchpad_core::domain::project::ProjectName;
use launchpad_core::domain::repository::ProjectRepository;
use launchpad_core::infrastructure::{DeployerRegistry, GitCommitResolver};

use super::{load_config, project_repository};

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// List configured projects
    List,

    /// List the branches of a project's repository
    Branches {
        /// Project name
        project: String,
    },

    /// Declare a new project in the configuration file
    Setup {
        /// Unique project name
        name: String,

        /// Repository URL or local path
        #[arg(long)]
        repo_url: String,

        /// Deployer key (shell, ci, noop, ...)
        #[arg(long)]
        deploy_type: String,

        /// Skip the repository access check
        #[arg(long)]
        skip_check: bool,
    },
}

pub async fn handle_command(
    command: ProjectCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ProjectCommand::List => list(config_override).await,
        ProjectCommand::Branches { project } => branches(config_override, &project).await,
        ProjectCommand::Setup {
            name,
            repo_url,
            deploy_type,
            skip_check,
        } => setup(config_override, &name, &repo_url, &deploy_type, skip_check).await,
    }
}

async fn list(config_override: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_override)?;
    let projects = project_repository(&config)?.list_all().await?;

    if projects.is_empty() {
        println!("{}", "No projects configured.".yellow());
        return Ok(());
    }

    println!("{}", "Projects:".bold());
    for project in projects {
        println!(
            "  {} ({})  {}",
            project.name.as_str().bold(),
            project.deploy_type,
            project.repo_url.as_str().dimmed()
        );
    }

    Ok(())
}

async fn branches(config_override: Option<PathBuf>, name: &str) -> Result<()> {
    let config = load_config(config_override)?;
    let name = ProjectName::new(name)?;
    let project = project_repository(&config)?
        .find_by_name(&name)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Project not found: {}", name))?;

    let resolver = GitCommitResolver::from_config(&config.spec.git);
    let branches = resolver
        .branches(&project)
        .await
        .with_context(|| format!("Failed to list branches of {}", project.name))?;

    for branch in branches {
        println!("{}", branch);
    }

    Ok(())
}

async fn setup(
    config_override: Option<PathBuf>,
    name: &str,
    repo_url: &str,
    deploy_type: &str,
    skip_check: bool,
) -> Result<()> {
    let path = config_override
        .or_else(LaunchpadConfigManifest::discover_config)
        .unwrap_or_else(|| PathBuf::from("./launchpad-config.yaml"));

    let mut config = if path.exists() {
        LaunchpadConfigManifest::from_yaml_file(&path)
            .with_context(|| format!("Failed to load config at {:?}", path))?
    } else {
        LaunchpadConfigManifest::default()
    };

    let project = config.add_project(name, repo_url, deploy_type)?;

    let registry = DeployerRegistry::from_config(&config);
    if !registry.is_registered(&project.deploy_type) {
        println!(
            "{}",
            format!(
                "⚠ No deployer registered for '{}' (available: {})",
                project.deploy_type,
                registry
                    .registered_types()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )
            .yellow()
        );
    }

    if !skip_check {
        println!("Checking repository access...");
        GitCommitResolver::from_config(&config.spec.git)
            .setup(&project)
            .await
            .with_context(|| format!("Cannot set up project {}", project.name))?;
    }

    config.validate().context("Configuration validation failed")?;
    config
        .to_yaml_file(&path)
        .with_context(|| format!("Failed to write config to {:?}", path))?;

    println!(
        "{}",
        format!("✓ Project {} added to {}", project.name, path.display()).green()
    );

    Ok(())
}
