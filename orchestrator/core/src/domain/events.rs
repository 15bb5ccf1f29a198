// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use crate::domain::deploy::DeployId;
use crate::domain::deploy_type::DeployType;
use crate::domain::project::ProjectName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure taxonomy reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ProjectNotFound,
    RepositoryInaccessible,
    BranchNotFound,
    UnknownDeployType,
    SetupFailed,
    ExecuteFailed,
    InvalidRequest,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::ProjectNotFound => "project_not_found",
            FailureKind::RepositoryInaccessible => "repository_inaccessible",
            FailureKind::BranchNotFound => "branch_not_found",
            FailureKind::UnknownDeployType => "unknown_deploy_type",
            FailureKind::SetupFailed => "setup_failed",
            FailureKind::ExecuteFailed => "execute_failed",
            FailureKind::InvalidRequest => "invalid_request",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deploy lifecycle events, published once per pipeline stage
///
/// Notification sinks (chat hooks, audit logs) subscribe to these instead of
/// being called by the orchestrator directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DeployEvent {
    DeployStarted {
        deploy_id: DeployId,
        project: ProjectName,
        deploy_type: DeployType,
        branch: String,
        commit: String,
        summary: String,
        via: String,
        started_at: DateTime<Utc>,
    },
    DeploySucceeded {
        deploy_id: DeployId,
        project: ProjectName,
        summary: String,
        duration_ms: u64,
        completed_at: DateTime<Utc>,
    },
    DeployFailed {
        /// Absent when the pipeline failed before a deploy was pinned
        deploy_id: Option<DeployId>,
        project: String,
        kind: FailureKind,
        reason: String,
        failed_at: DateTime<Utc>,
    },
}

impl DeployEvent {
    pub fn project(&self) -> &str {
        match self {
            DeployEvent::DeployStarted { project, .. } => project.as_str(),
            DeployEvent::DeploySucceeded { project, .. } => project.as_str(),
            DeployEvent::DeployFailed { project, .. } => project,
        }
    }

    pub fn deploy_id(&self) -> Option<DeployId> {
        match self {
            DeployEvent::DeployStarted { deploy_id, .. } => Some(*deploy_id),
            DeployEvent::DeploySucceeded { deploy_id, .. } => Some(*deploy_id),
            DeployEvent::DeployFailed { deploy_id, .. } => *deploy_id,
        }
    }
}
