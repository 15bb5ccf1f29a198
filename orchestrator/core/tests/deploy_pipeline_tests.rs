// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::FixtureRepo;
use launchpad_core::application::{DeployOrchestrator, FailureKind};
use launchpad_core::domain::config::LaunchpadConfigManifest;
use launchpad_core::domain::deploy::DeployRequest;
use launchpad_core::domain::deploy_type::DeployType;
use launchpad_core::domain::events::DeployEvent;
use launchpad_core::domain::project::Project;
use launchpad_core::domain::repository::ProjectRepository;
use launchpad_core::infrastructure::deployers::{DeployerRegistry, MockDeployer};
use launchpad_core::infrastructure::event_bus::EventBus;
use launchpad_core::infrastructure::git::GitCommitResolver;
use launchpad_core::infrastructure::repositories::InMemoryProjectRepository;
use tempfile::TempDir;
use tokio::time::timeout;

struct Harness {
    repo: FixtureRepo,
    _cache: TempDir,
    mock: Arc<MockDeployer>,
    orchestrator: DeployOrchestrator,
}

fn harness(deploy_type: &str) -> Harness {
    let repo = FixtureRepo::new();
    let cache = tempfile::tempdir().unwrap();

    let projects = InMemoryProjectRepository::from_projects(vec![
        Project::parse("demo", &repo.url(), deploy_type).unwrap(),
    ]);
    let mock = Arc::new(MockDeployer::new());
    let registry = DeployerRegistry::new();
    registry.register_instance(DeployType::parse("mock").unwrap(), mock.clone());

    let orchestrator = DeployOrchestrator::new(
        Arc::new(projects),
        Arc::new(GitCommitResolver::new(cache.path())),
        Arc::new(registry),
    );

    Harness {
        repo,
        _cache: cache,
        mock,
        orchestrator,
    }
}

#[tokio::test]
async fn test_default_branch_deploy() {
    let h = harness("mock");

    let outcome = h.orchestrator.deploy(DeployRequest::new("demo")).await;

    assert!(outcome.is_success(), "{:?}", outcome.failure_reason());
    let head = &h.repo.master[0];
    assert_eq!(
        outcome.summary.as_deref(),
        Some(format!("executing deploy demo/master/{}", head).as_str())
    );

    let executions = h.mock.executions();
    assert_eq!(executions.len(), 1);
    let (deploy, params) = &executions[0];
    assert_eq!(&deploy.commit, head);
    assert_eq!(params.branch(), "master");
    assert!(params.actions().is_none());
    assert!(params.env().is_none());
    assert!(params.box_name().is_none());
}

#[tokio::test]
async fn test_actions_environment_and_box() {
    let h = harness("mock");

    let outcome = h
        .orchestrator
        .deploy(
            DeployRequest::new("demo")
                .actions(["migrate", "restart"])
                .environment("staging")
                .box_name("web1"),
        )
        .await;

    assert!(outcome.is_success());
    let summary = outcome.summary.unwrap();
    assert!(summary.starts_with("executing deploy/migrate/restart demo/master/"));
    assert!(summary.ends_with("to staging/web1"));

    let (_, params) = &h.mock.executions()[0];
    assert_eq!(
        params.actions(),
        Some(&["migrate".to_string(), "restart".to_string()][..])
    );
    assert_eq!(params.env(), Some("staging"));
    assert_eq!(params.box_name(), Some("web1"));
}

#[tokio::test]
async fn test_box_without_environment_is_dropped() {
    let h = harness("mock");

    let outcome = h
        .orchestrator
        .deploy(DeployRequest::new("demo").box_name("web1"))
        .await;

    assert!(outcome.is_success());
    assert!(!outcome.summary.unwrap().contains("web1"));
    let (_, params) = &h.mock.executions()[0];
    assert!(params.env().is_none());
    assert!(params.box_name().is_none());
}

#[tokio::test]
async fn test_unregistered_deploy_type() {
    let h = harness("heroku");

    let outcome = h.orchestrator.deploy(DeployRequest::new("demo")).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::UnknownDeployType));
    assert_eq!(h.mock.setup_calls(), 0);
    assert_eq!(h.mock.execute_calls(), 0);
}

#[tokio::test]
async fn test_missing_branch() {
    let h = harness("mock");

    let outcome = h
        .orchestrator
        .deploy(DeployRequest::new("demo").branch("no-branch"))
        .await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::BranchNotFound));
    assert!(outcome.deploy.is_none());
    assert_eq!(h.mock.setup_calls(), 0);
}

#[tokio::test]
async fn test_topic_branch_pins_topic_head() {
    let h = harness("mock");

    let outcome = h
        .orchestrator
        .deploy(DeployRequest::new("demo").branch("topic").via("web"))
        .await;

    let deploy = outcome.deploy.unwrap();
    assert_eq!(deploy.commit, h.repo.topic_head);
    assert_eq!(deploy.via, "web");
    assert_eq!(h.mock.executions()[0].1.metadata().get("via").map(String::as_str), Some("web"));
}

#[tokio::test]
async fn test_events_published() {
    let h = harness("mock");
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();
    let orchestrator = h.orchestrator.with_event_bus(bus);

    let outcome = orchestrator.deploy(DeployRequest::new("demo")).await;
    assert!(outcome.is_success());

    let started = timeout(Duration::from_secs(1), events.recv()).await.unwrap().unwrap();
    let succeeded = timeout(Duration::from_secs(1), events.recv()).await.unwrap().unwrap();

    match started {
        DeployEvent::DeployStarted { commit, deploy_type, .. } => {
            assert_eq!(commit, h.repo.master[0]);
            assert_eq!(deploy_type.as_str(), "mock");
        }
        other => panic!("expected DeployStarted, got {other:?}"),
    }
    assert!(matches!(succeeded, DeployEvent::DeploySucceeded { .. }));

    let outcome = orchestrator
        .deploy(DeployRequest::new("demo").branch("no-branch"))
        .await;
    assert!(!outcome.is_success());

    match timeout(Duration::from_secs(1), events.recv()).await.unwrap().unwrap() {
        DeployEvent::DeployFailed { kind, deploy_id, .. } => {
            assert_eq!(kind, FailureKind::BranchNotFound);
            assert!(deploy_id.is_none());
        }
        other => panic!("expected DeployFailed, got {other:?}"),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_shell_deployer_runs_script_at_pinned_commit() {
    let repo = FixtureRepo::new();
    let work = tempfile::tempdir().unwrap();
    let out = work.path().join("deploy.out");

    let mut config = LaunchpadConfigManifest::default();
    config.spec.git.cache_dir = work.path().join("repos");
    config.spec.deployers.shell.workspace_dir = work.path().join("workspaces");
    config.add_project("demo", &repo.url(), "shell").unwrap();

    let orchestrator = DeployOrchestrator::new(
        Arc::new(InMemoryProjectRepository::from_projects(config.projects().unwrap())),
        Arc::new(GitCommitResolver::from_config(&config.spec.git)),
        Arc::new(DeployerRegistry::from_config(&config)),
    );

    let outcome = orchestrator
        .deploy(
            DeployRequest::new("demo")
                .branch("topic")
                .actions(["migrate", "restart"])
                .environment("production")
                .box_name("app2")
                .variable("out", out.to_string_lossy())
                .via("cli"),
        )
        .await;

    assert!(outcome.is_success(), "{:?}", outcome.failure_reason());

    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.contains("project=demo"));
    assert!(written.contains("branch=topic"));
    assert!(written.contains(&format!("commit={}", repo.topic_head)));
    assert!(written.contains("env=production"));
    assert!(written.contains("box=app2"));
    assert!(written.contains("actions=migrate,restart"));
    assert!(written.contains("args=migrate restart"));
    assert!(written.contains("via=cli"));

    // Second deploy reuses the working copy and moves it to master
    let outcome = orchestrator
        .deploy(DeployRequest::new("demo").variable("out", out.to_string_lossy()))
        .await;
    assert!(outcome.is_success(), "{:?}", outcome.failure_reason());
    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.contains(&format!("commit={}", repo.master[0])));
    assert!(written.contains("env=\n"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_shell_deployer_script_failure() {
    let repo = FixtureRepo::new();
    let work = tempfile::tempdir().unwrap();

    let mut config = LaunchpadConfigManifest::default();
    config.spec.git.cache_dir = work.path().join("repos");
    config.spec.deployers.shell.workspace_dir = work.path().join("workspaces");
    config.spec.deployers.shell.script = "script/missing".to_string();
    config.add_project("demo", &repo.url(), "shell").unwrap();

    let orchestrator = DeployOrchestrator::new(
        Arc::new(InMemoryProjectRepository::from_projects(config.projects().unwrap())),
        Arc::new(GitCommitResolver::from_config(&config.spec.git)),
        Arc::new(DeployerRegistry::from_config(&config)),
    );

    let outcome = orchestrator.deploy(DeployRequest::new("demo")).await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::ExecuteFailed));
    assert!(outcome.failure_reason().unwrap().contains("script/missing"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_shell_deployer_follows_repository_change() {
    let first = FixtureRepo::new();
    let mut second = FixtureRepo::new();
    let moved_head = second.commit_on_master("MOVED");
    let work = tempfile::tempdir().unwrap();
    let out = work.path().join("deploy.out");

    let mut config = LaunchpadConfigManifest::default();
    config.spec.git.cache_dir = work.path().join("repos");
    config.spec.deployers.shell.workspace_dir = work.path().join("workspaces");
    config.add_project("demo", &first.url(), "shell").unwrap();

    let projects = InMemoryProjectRepository::from_projects(config.projects().unwrap());
    let orchestrator = DeployOrchestrator::new(
        Arc::new(projects.clone()),
        Arc::new(GitCommitResolver::from_config(&config.spec.git)),
        Arc::new(DeployerRegistry::from_config(&config)),
    );
    let request = || DeployRequest::new("demo").variable("out", out.to_string_lossy());

    let outcome = orchestrator.deploy(request()).await;
    assert!(outcome.is_success(), "{:?}", outcome.failure_reason());

    projects
        .save(&Project::parse("demo", &second.url(), "shell").unwrap())
        .await
        .unwrap();

    let outcome = orchestrator.deploy(request()).await;
    assert!(outcome.is_success(), "{:?}", outcome.failure_reason());
    assert_eq!(outcome.deploy.unwrap().commit, moved_head);
    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.contains(&format!("commit={}", moved_head)));
}

#[cfg(unix)]
#[tokio::test]
async fn test_shell_deployer_script_timeout() {
    let mut repo = FixtureRepo::new();
    repo.commit_deploy_script("#!/bin/sh\necho started\nsleep 30\n");
    let work = tempfile::tempdir().unwrap();

    let mut config = LaunchpadConfigManifest::default();
    config.spec.git.cache_dir = work.path().join("repos");
    config.spec.deployers.shell.workspace_dir = work.path().join("workspaces");
    config.spec.deployers.shell.timeout_secs = 1;
    config.add_project("demo", &repo.url(), "shell").unwrap();

    let orchestrator = DeployOrchestrator::new(
        Arc::new(InMemoryProjectRepository::from_projects(config.projects().unwrap())),
        Arc::new(GitCommitResolver::from_config(&config.spec.git)),
        Arc::new(DeployerRegistry::from_config(&config)),
    );

    let outcome = timeout(
        Duration::from_secs(20),
        orchestrator.deploy(DeployRequest::new("demo")),
    )
    .await
    .unwrap();
    assert_eq!(outcome.failure_kind(), Some(FailureKind::ExecuteFailed));
    assert!(outcome.failure_reason().unwrap().contains("timed out after 1s"));
}
