// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Deployer Domain Interface (Anti-Corruption Layer)
//
// Every deploy mechanism (shell script, CI trigger, mock) implements this
// trait. The orchestrator only ever sees the two operations below; adapters
// are free to shell out or call remote APIs internally.
//
// Implementations in infrastructure/deployers/ directory.

use crate::domain::deploy::{Deploy, DeployParameters};
use crate::domain::project::Project;
use async_trait::async_trait;

/// Capability set of a deploy mechanism
///
/// There is no default implementor: a type must at least provide
/// [`Deployer::execute`] to be usable.
#[async_trait]
pub trait Deployer: Send + Sync {
    /// Prepare the deploy target (validate access, provision resources)
    ///
    /// Must be idempotent. The default does nothing and succeeds.
    async fn setup(
        &self,
        _project: &Project,
        _params: &DeployParameters,
    ) -> Result<(), DeployerError> {
        Ok(())
    }

    /// Deploy the pinned commit described by `deploy`
    async fn execute(
        &self,
        deploy: &Deploy,
        params: &DeployParameters,
    ) -> Result<(), DeployerError>;
}

/// Errors reported by deployer adapters
#[derive(Debug, thiserror::Error)]
pub enum DeployerError {
    /// The adapter ran but reported failure
    #[error("deployer reported failure: {0}")]
    Rejected(String),

    #[error("invalid deployer configuration: {0}")]
    Configuration(String),

    #[error("command `{command}` exited with {status}")]
    CommandFailed { command: String, status: String },

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("remote trigger failed: {0}")]
    Remote(String),

    #[error("git error: {0}")]
    Git(#[from] crate::domain::commit::GitError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
