// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Launchpad Core
//!
//! Deploy orchestration: pins a project branch to a commit and dispatches the
//! deploy through the adapter registered for the project's deploy type.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain model, deploy pipeline and its git/adapter infrastructure
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use std::sync::Arc;
//! use launchpad_core::application::DeployOrchestrator;
//! use launchpad_core::domain::config::LaunchpadConfigManifest;
//! use launchpad_core::domain::deploy::DeployRequest;
//! use launchpad_core::infrastructure::{DeployerRegistry, GitCommitResolver, InMemoryProjectRepository};
//!
//! let config = LaunchpadConfigManifest::load_or_default(None)?;
//! let orchestrator = DeployOrchestrator::new(
//!     Arc::new(InMemoryProjectRepository::from_projects(config.projects()?)),
//!     Arc::new(GitCommitResolver::from_config(&config.spec.git)),
//!     Arc::new(DeployerRegistry::from_config(&config)),
//! );
//!
//! let outcome = orchestrator
//!     .deploy(DeployRequest::new("demo").environment("staging"))
//!     .await;
//! println!("{:?}", outcome.summary);
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use domain::*;
