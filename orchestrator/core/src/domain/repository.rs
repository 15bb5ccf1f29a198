// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contract for the `Project` aggregate. Project records are owned
//! by whatever host embeds the deploy core (a database behind a web front end,
//! a YAML file for the CLI); the core only reads them for the duration of one
//! deploy.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `ProjectRepository` | `Project` | `InMemoryProjectRepository` |
//!
//! Deploy records are handed back to the caller inside the pipeline outcome
//! and are persisted (or not) by the caller.

use crate::domain::project::{Project, ProjectName};
use async_trait::async_trait;

/// Repository interface for Project aggregates
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Save project (create or replace by name)
    ///
    /// Hosts call this when a project is edited; the next deploy resolves
    /// against the saved repository.
    async fn save(&self, project: &Project) -> Result<(), RepositoryError>;

    /// Find project by its unique name
    async fn find_by_name(&self, name: &ProjectName) -> Result<Option<Project>, RepositoryError>;

    /// List all projects, ordered by name
    async fn list_all(&self) -> Result<Vec<Project>, RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
