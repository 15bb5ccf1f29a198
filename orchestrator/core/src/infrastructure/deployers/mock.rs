// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Mock Deployer - Recording adapter for tests
//
// Records every setup/execute call instead of deploying anything. Can be told
// to fail either step. Recorded calls are never drained, so it is not
// registered from configuration.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use tracing::info;

use crate::domain::deploy::{Deploy, DeployParameters};
use crate::domain::deployer::{Deployer, DeployerError};
use crate::domain::project::{Project, ProjectName};

#[derive(Debug, Default)]
struct MockState {
    setup_calls: usize,
    prepared: BTreeSet<ProjectName>,
    executions: Vec<(Deploy, DeployParameters)>,
}

#[derive(Debug, Default)]
pub struct MockDeployer {
    state: Mutex<MockState>,
    fail_setup: Option<String>,
    fail_execute: Option<String>,
}

impl MockDeployer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose setup always fails with `reason`
    pub fn failing_setup(reason: impl Into<String>) -> Self {
        Self {
            fail_setup: Some(reason.into()),
            ..Self::default()
        }
    }

    /// A mock whose execute always fails with `reason`
    pub fn failing_execute(reason: impl Into<String>) -> Self {
        Self {
            fail_execute: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn setup_calls(&self) -> usize {
        self.state.lock().setup_calls
    }

    /// Projects that have been set up at least once
    pub fn prepared_projects(&self) -> Vec<ProjectName> {
        self.state.lock().prepared.iter().cloned().collect()
    }

    pub fn execute_calls(&self) -> usize {
        self.state.lock().executions.len()
    }

    /// Every executed deploy with the parameters it received, in call order
    pub fn executions(&self) -> Vec<(Deploy, DeployParameters)> {
        self.state.lock().executions.clone()
    }
}

#[async_trait]
impl Deployer for MockDeployer {
    async fn setup(
        &self,
        project: &Project,
        _params: &DeployParameters,
    ) -> Result<(), DeployerError> {
        let mut state = self.state.lock();
        state.setup_calls += 1;

        if let Some(reason) = &self.fail_setup {
            return Err(DeployerError::Rejected(reason.clone()));
        }

        state.prepared.insert(project.name.clone());
        Ok(())
    }

    async fn execute(
        &self,
        deploy: &Deploy,
        params: &DeployParameters,
    ) -> Result<(), DeployerError> {
        self.state.lock().executions.push((deploy.clone(), params.clone()));

        if let Some(reason) = &self.fail_execute {
            return Err(DeployerError::Rejected(reason.clone()));
        }

        info!(deploy_id = %deploy.id, summary = %deploy.summary(), "Mock deploy executed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commit::ResolvedCommit;
    use crate::domain::deploy::DeployRequest;

    fn project() -> Project {
        Project::parse("demo", "./repo", "mock").unwrap()
    }

    #[tokio::test]
    async fn test_setup_is_idempotent() {
        let mock = MockDeployer::new();
        let params = DeployParameters::new("master", vec![], None, None);

        mock.setup(&project(), &params).await.unwrap();
        let after_one = mock.prepared_projects();
        mock.setup(&project(), &params).await.unwrap();

        assert_eq!(mock.prepared_projects(), after_one);
        assert_eq!(mock.setup_calls(), 2);
    }

    #[tokio::test]
    async fn test_records_executions() {
        let mock = MockDeployer::new();
        let commit = ResolvedCommit {
            branch: "master".into(),
            hash: "abc123".into(),
        };
        let deploy = Deploy::from_request(&project(), &DeployRequest::new("demo"), &commit);
        let params = deploy.parameters();

        mock.execute(&deploy, &params).await.unwrap();

        let executions = mock.executions();
        assert_eq!(executions.len(), 1);
        assert_eq!(executions[0].0.commit, "abc123");
        assert_eq!(executions[0].1, params);
    }

    #[tokio::test]
    async fn test_configured_failures() {
        let params = DeployParameters::new("master", vec![], None, None);

        let mock = MockDeployer::failing_setup("no access");
        let err = mock.setup(&project(), &params).await.unwrap_err();
        assert!(err.to_string().contains("no access"));
        assert!(mock.prepared_projects().is_empty());

        let mock = MockDeployer::failing_execute("boom");
        assert!(mock.setup(&project(), &params).await.is_ok());
    }
}
