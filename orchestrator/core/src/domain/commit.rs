// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Commit Resolution - Domain Interface
//
// Pins a branch to an exact revision before anything is deployed.
// The git-backed implementation lives in infrastructure/git/.

use crate::domain::project::Project;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Branch pinned to the commit that will be deployed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCommit {
    pub branch: String,
    pub hash: String,
}

impl ResolvedCommit {
    /// Pick the commit to deploy from a resolver result
    ///
    /// Hashes are ordered most recent first; index 0 always wins. Returns
    /// `None` for an empty result (branch not found).
    pub fn from_hashes(branch: &str, hashes: &[String]) -> Option<Self> {
        hashes.first().map(|hash| Self {
            branch: branch.to_string(),
            hash: hash.clone(),
        })
    }

    /// Abbreviated hash for display
    pub fn short_hash(&self) -> &str {
        let end = self.hash.len().min(7);
        &self.hash[..end]
    }
}

/// Resolves branches of a project's repository to commit hashes
#[async_trait]
pub trait CommitResolver: Send + Sync {
    /// Materialise (clone or refresh) the project's repository cache
    ///
    /// Idempotent: calling it on an already set-up project refreshes it.
    async fn setup(&self, project: &Project) -> Result<(), GitError>;

    /// Commit hashes for `branch`, most recent first
    ///
    /// An unknown branch yields `Ok(vec![])`; an unreachable repository
    /// yields [`GitError::RepositoryInaccessible`].
    async fn resolve(&self, project: &Project, branch: &str) -> Result<Vec<String>, GitError>;

    /// Branch names available in the project's repository, sorted
    async fn branches(&self, project: &Project) -> Result<Vec<String>, GitError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("repository {url} is inaccessible: {reason}")]
    RepositoryInaccessible { url: String, reason: String },

    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("failed to run git: {0}")]
    Io(#[from] std::io::Error),
}

impl GitError {
    /// True when the repository itself could not be reached (as opposed to a
    /// local failure while querying an existing cache)
    pub fn is_inaccessible(&self) -> bool {
        matches!(self, GitError::RepositoryInaccessible { .. })
    }
}
