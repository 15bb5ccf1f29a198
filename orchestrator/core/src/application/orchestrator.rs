// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Deploy Orchestrator
//!
//! Application service that turns a [`DeployRequest`] into a dispatched deploy.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Sequence one deploy: validate, resolve commit, build
//!   parameters, select adapter, setup, execute, report
//! - **Collaborators:**
//!   - Domain: Project, Deploy, DeployParameters, CommitResolver, Deployer
//!   - Infrastructure: ProjectRepository, DeployerRegistry, EventBus
//!
//! Every step fails fast. Failures never escape as `Err`: they are folded into
//! the returned [`DeployOutcome`] tagged with a [`FailureKind`], and the caller
//! decides how to render or persist them.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::commit::{CommitResolver, ResolvedCommit};
use crate::domain::deploy::{Deploy, DeployRequest};
use crate::domain::deploy_type::DeployType;
use crate::domain::events::DeployEvent;
use crate::domain::project::{Project, ProjectName};
use crate::domain::repository::ProjectRepository;
use crate::infrastructure::deployers::{DeployerRegistry, RegistryError};
use crate::infrastructure::event_bus::EventBus;

pub use crate::domain::events::FailureKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeployError {
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("repository for {project} is inaccessible: {reason}")]
    RepositoryInaccessible { project: String, reason: String },

    #[error("branch {branch} not found in {project}")]
    BranchNotFound { project: String, branch: String },

    #[error("unknown deploy type: {0}")]
    UnknownDeployType(String),

    #[error("{deploy_type} setup failed: {reason}")]
    SetupFailed { deploy_type: String, reason: String },

    #[error("{deploy_type} execute failed: {reason}")]
    ExecuteFailed { deploy_type: String, reason: String },

    #[error("invalid deploy request: {0}")]
    InvalidRequest(String),
}

impl DeployError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DeployError::ProjectNotFound(_) => FailureKind::ProjectNotFound,
            DeployError::RepositoryInaccessible { .. } => FailureKind::RepositoryInaccessible,
            DeployError::BranchNotFound { .. } => FailureKind::BranchNotFound,
            DeployError::UnknownDeployType(_) => FailureKind::UnknownDeployType,
            DeployError::SetupFailed { .. } => FailureKind::SetupFailed,
            DeployError::ExecuteFailed { .. } => FailureKind::ExecuteFailed,
            DeployError::InvalidRequest(_) => FailureKind::InvalidRequest,
        }
    }
}

/// Terminal state of one deploy invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployStatus {
    Succeeded,
    Failed(DeployError),
}

/// Result of [`DeployOrchestrator::deploy`]
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub status: DeployStatus,
    /// Present once the commit has been pinned, whatever the final status
    pub summary: Option<String>,
    /// The pinned deploy, for the caller to persist
    pub deploy: Option<Deploy>,
}

impl DeployOutcome {
    fn failed(error: DeployError, deploy: Option<Deploy>) -> Self {
        Self {
            status: DeployStatus::Failed(error),
            summary: deploy.as_ref().map(Deploy::summary),
            deploy,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, DeployStatus::Succeeded)
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.error().map(DeployError::kind)
    }

    pub fn error(&self) -> Option<&DeployError> {
        match &self.status {
            DeployStatus::Succeeded => None,
            DeployStatus::Failed(error) => Some(error),
        }
    }

    /// Human-readable failure message, if any
    pub fn failure_reason(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }
}

/// Deploy Orchestrator
pub struct DeployOrchestrator {
    projects: Arc<dyn ProjectRepository>,
    resolver: Arc<dyn CommitResolver>,
    registry: Arc<DeployerRegistry>,
    event_bus: Option<EventBus>,
}

impl DeployOrchestrator {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        resolver: Arc<dyn CommitResolver>,
        registry: Arc<DeployerRegistry>,
    ) -> Self {
        Self {
            projects,
            resolver,
            registry,
            event_bus: None,
        }
    }

    /// Publish deploy lifecycle events on `event_bus`
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn registry(&self) -> &Arc<DeployerRegistry> {
        &self.registry
    }

    /// Run the full pipeline for `request`
    pub async fn deploy(&self, request: DeployRequest) -> DeployOutcome {
        let started = Instant::now();

        // Steps 1-3: validate, resolve commit, build the pinned deploy
        let (project, deploy) = match self.prepare(&request).await {
            Ok(prepared) => prepared,
            Err(error) => {
                self.report_failure(&request.project, None, &error);
                return DeployOutcome::failed(error, None);
            }
        };

        let summary = deploy.summary();
        info!(deploy_id = %deploy.id, via = %deploy.via, "{}", summary);

        self.publish(DeployEvent::DeployStarted {
            deploy_id: deploy.id,
            project: deploy.project.clone(),
            deploy_type: project.deploy_type.clone(),
            branch: deploy.branch.clone(),
            commit: deploy.commit.clone(),
            summary: summary.clone(),
            via: deploy.via.clone(),
            started_at: Utc::now(),
        });

        // Steps 4-6: select adapter, setup, execute
        if let Err(error) = self.dispatch(&project, &deploy).await {
            self.report_failure(project.name.as_str(), Some(&deploy), &error);
            return DeployOutcome::failed(error, Some(deploy));
        }

        let elapsed = started.elapsed();
        info!(
            deploy_id = %deploy.id,
            duration_ms = elapsed.as_millis() as u64,
            "Deploy succeeded"
        );
        metrics::counter!("launchpad.deploys", "status" => "succeeded").increment(1);
        metrics::histogram!("launchpad.deploy.duration").record(elapsed.as_secs_f64());

        self.publish(DeployEvent::DeploySucceeded {
            deploy_id: deploy.id,
            project: deploy.project.clone(),
            summary: summary.clone(),
            duration_ms: elapsed.as_millis() as u64,
            completed_at: Utc::now(),
        });

        // Step 7: report
        DeployOutcome {
            status: DeployStatus::Succeeded,
            summary: Some(summary),
            deploy: Some(deploy),
        }
    }

    /// Validate the request, pin it to a commit and build the deploy record
    ///
    /// Nothing is dispatched; useful for previews and dry runs.
    pub async fn prepare(&self, request: &DeployRequest) -> Result<(Project, Deploy), DeployError> {
        let project = self.find_project(&request.project).await?;

        let branch = request.effective_branch();
        validate_branch(branch)?;

        let commit = self.resolve_commit(&project, branch).await?;
        let deploy = Deploy::from_request(&project, request, &commit);

        Ok((project, deploy))
    }

    async fn find_project(&self, name: &str) -> Result<Project, DeployError> {
        let not_found = || DeployError::ProjectNotFound(name.trim().to_string());

        let name = ProjectName::new(name).map_err(|_| not_found())?;
        match self.projects.find_by_name(&name).await {
            Ok(Some(project)) => Ok(project),
            Ok(None) => Err(not_found()),
            Err(e) => {
                warn!(project = %name, "Project lookup failed: {}", e);
                Err(not_found())
            }
        }
    }

    async fn resolve_commit(
        &self,
        project: &Project,
        branch: &str,
    ) -> Result<ResolvedCommit, DeployError> {
        let hashes = self
            .resolver
            .resolve(project, branch)
            .await
            .map_err(|e| DeployError::RepositoryInaccessible {
                project: project.name.to_string(),
                reason: e.to_string(),
            })?;

        let commit = ResolvedCommit::from_hashes(branch, &hashes).ok_or_else(|| {
            DeployError::BranchNotFound {
                project: project.name.to_string(),
                branch: branch.to_string(),
            }
        })?;

        debug!(
            project = %project.name,
            branch = %branch,
            commit = %commit.short_hash(),
            "Pinned branch head"
        );
        Ok(commit)
    }

    async fn dispatch(&self, project: &Project, deploy: &Deploy) -> Result<(), DeployError> {
        let deployer = self
            .registry
            .resolve(&project.deploy_type)
            .map_err(|e| unknown_deploy_type(&project.deploy_type, e))?;

        let params = deploy.parameters();
        let deploy_type = project.deploy_type.to_string();

        deployer
            .setup(project, &params)
            .await
            .map_err(|e| DeployError::SetupFailed {
                deploy_type: deploy_type.clone(),
                reason: e.to_string(),
            })?;

        deployer
            .execute(deploy, &params)
            .await
            .map_err(|e| DeployError::ExecuteFailed {
                deploy_type,
                reason: e.to_string(),
            })
    }

    fn report_failure(&self, project: &str, deploy: Option<&Deploy>, error: &DeployError) {
        let kind = error.kind();
        warn!(project = %project, kind = %kind, "Deploy failed: {}", error);
        metrics::counter!("launchpad.deploys", "status" => "failed", "kind" => kind.as_str())
            .increment(1);

        self.publish(DeployEvent::DeployFailed {
            deploy_id: deploy.map(|d| d.id),
            project: project.trim().to_string(),
            kind,
            reason: error.to_string(),
            failed_at: Utc::now(),
        });
    }

    fn publish(&self, event: DeployEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}

fn unknown_deploy_type(deploy_type: &DeployType, error: RegistryError) -> DeployError {
    match error {
        RegistryError::NotRegistered(_) => DeployError::UnknownDeployType(deploy_type.to_string()),
        RegistryError::Construction { source, .. } => {
            DeployError::UnknownDeployType(format!("{} ({})", deploy_type, source))
        }
    }
}

/// Reject branch names git would read as options or that no ref can have
fn validate_branch(branch: &str) -> Result<(), DeployError> {
    let invalid = branch.starts_with('-')
        || branch.contains("..")
        || branch.chars().any(|c| c.is_whitespace() || c.is_control());
    if invalid {
        return Err(DeployError::InvalidRequest(format!(
            "invalid branch name: {:?}",
            branch
        )));
    }
    Ok(())
}
