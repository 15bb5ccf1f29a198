// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the repository abstractions defined in
//! the domain layer.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Retrieve the project records a deploy runs against
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! - **InMemoryProjectRepository** - Thread-safe HashMap-backed storage, seeded
//!   from the `projects` section of the configuration manifest by the CLI and
//!   used directly by tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::project::{Project, ProjectName};
use crate::domain::repository::{ProjectRepository, RepositoryError};

#[derive(Clone, Default)]
pub struct InMemoryProjectRepository {
    projects: Arc<RwLock<HashMap<ProjectName, Project>>>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with `projects`; later duplicates replace earlier ones
    pub fn from_projects(projects: impl IntoIterator<Item = Project>) -> Self {
        let map = projects
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();
        Self {
            projects: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn save(&self, project: &Project) -> Result<(), RepositoryError> {
        self.projects
            .write()
            .insert(project.name.clone(), project.clone());
        Ok(())
    }

    async fn find_by_name(&self, name: &ProjectName) -> Result<Option<Project>, RepositoryError> {
        Ok(self.projects.read().get(name).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Project>, RepositoryError> {
        let mut projects: Vec<Project> = self.projects.read().values().cloned().collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }
}
