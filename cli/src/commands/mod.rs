// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Launchpad CLI

pub mod config;
pub mod deploy;
pub mod project;

pub use self::config::ConfigCommand;
pub use self::deploy::DeployArgs;
pub use self::project::ProjectCommand;

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use launchpad_core::application::DeployOrchestrator;
use launchpad_core::domain::config::LaunchpadConfigManifest;
use launchpad_core::infrastructure::{
    DeployerRegistry, EventBus, GitCommitResolver, InMemoryProjectRepository,
};

/// Load the configuration and fail early on anything `validate` rejects
pub(crate) fn load_config(config_override: Option<PathBuf>) -> Result<LaunchpadConfigManifest> {
    let config = LaunchpadConfigManifest::load_or_default(config_override)
        .context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

/// Project records declared in the configuration
pub(crate) fn project_repository(
    config: &LaunchpadConfigManifest,
) -> Result<InMemoryProjectRepository> {
    Ok(InMemoryProjectRepository::from_projects(config.projects()?))
}

/// Wire the deploy pipeline from configuration
pub(crate) fn build_orchestrator(config: &LaunchpadConfigManifest) -> Result<DeployOrchestrator> {
    Ok(DeployOrchestrator::new(
        Arc::new(project_repository(config)?),
        Arc::new(GitCommitResolver::from_config(&config.spec.git)),
        Arc::new(DeployerRegistry::from_config(config)),
    )
    .with_event_bus(EventBus::with_default_capacity()))
}
