// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Project
//!
//! A deployable project: a unique name, the repository commits are resolved
//! from, and the deploy type that selects its deployer adapter.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Project aggregate consumed (never persisted) by the deploy core

use crate::domain::deploy_type::DeployType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique project name (e.g. `"demo"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectName(String);

impl ProjectName {
    pub fn new(name: impl Into<String>) -> Result<Self, ProjectError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ProjectError::EmptyName);
        }
        // Used as a directory name for repository caches and workspaces
        if trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
            return Err(ProjectError::InvalidName(name));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Location of a git repository: a local path or a remote URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryLocation(String);

impl RepositoryLocation {
    pub fn new(location: impl Into<String>) -> Result<Self, ProjectError> {
        let location = location.into();
        if location.trim().is_empty() {
            return Err(ProjectError::EmptyRepositoryUrl);
        }
        Ok(Self(location.trim().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for scp-style (`git@host:path`) and scheme URLs (`https://`, `ssh://`, `file://`)
    pub fn is_remote(&self) -> bool {
        self.0.contains("://") || (self.0.contains('@') && self.0.contains(':'))
    }
}

impl fmt::Display for RepositoryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: ProjectName,
    pub repo_url: RepositoryLocation,
    pub deploy_type: DeployType,
}

impl Project {
    pub fn new(name: ProjectName, repo_url: RepositoryLocation, deploy_type: DeployType) -> Self {
        Self {
            name,
            repo_url,
            deploy_type,
        }
    }

    /// Build a project from raw strings, validating each field
    pub fn parse(name: &str, repo_url: &str, deploy_type: &str) -> Result<Self, ProjectError> {
        Ok(Self {
            name: ProjectName::new(name)?,
            repo_url: RepositoryLocation::new(repo_url)?,
            deploy_type: DeployType::parse(deploy_type)
                .map_err(|e| ProjectError::InvalidDeployType(e.to_string()))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectError {
    #[error("project name cannot be empty")]
    EmptyName,

    #[error("invalid project name: {0:?}")]
    InvalidName(String),

    #[error("repository url cannot be empty")]
    EmptyRepositoryUrl,

    #[error("{0}")]
    InvalidDeployType(String),
}
