// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

mod common;

use common::FixtureRepo;
use launchpad_core::domain::commit::CommitResolver;
use launchpad_core::domain::config::GitConfig;
use launchpad_core::domain::project::Project;
use launchpad_core::infrastructure::git::GitCommitResolver;

fn project(url: &str) -> Project {
    Project::parse("demo", url, "mock").unwrap()
}

#[tokio::test]
async fn test_resolve_returns_most_recent_first() {
    let repo = FixtureRepo::new();
    let cache = tempfile::tempdir().unwrap();
    let resolver = GitCommitResolver::new(cache.path());

    let hashes = resolver.resolve(&project(&repo.url()), "master").await.unwrap();
    assert_eq!(hashes, repo.master);

    let topic = resolver.resolve(&project(&repo.url()), "topic").await.unwrap();
    assert_eq!(topic[0], repo.topic_head);
    assert_eq!(&topic[1..], &repo.master[..]);
}

#[tokio::test]
async fn test_missing_branch_is_empty_not_error() {
    let repo = FixtureRepo::new();
    let cache = tempfile::tempdir().unwrap();
    let resolver = GitCommitResolver::new(cache.path());

    let hashes = resolver.resolve(&project(&repo.url()), "no-branch").await.unwrap();
    assert!(hashes.is_empty());
}

#[tokio::test]
async fn test_unreachable_repository_is_error() {
    let missing = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    let resolver = GitCommitResolver::new(cache.path());

    let url = missing.path().join("nowhere.git");
    let err = resolver
        .resolve(&project(&url.to_string_lossy()), "master")
        .await
        .unwrap_err();
    assert!(err.is_inaccessible(), "unexpected error: {err}");

    let err = resolver
        .setup(&project("file:///definitely/not/a/repository.git"))
        .await
        .unwrap_err();
    assert!(err.is_inaccessible());
}

#[tokio::test]
async fn test_setup_is_idempotent() {
    let repo = FixtureRepo::new();
    let cache = tempfile::tempdir().unwrap();
    let resolver = GitCommitResolver::new(cache.path());
    let project = project(&repo.url());

    resolver.setup(&project).await.unwrap();
    resolver.setup(&project).await.unwrap();

    assert!(resolver.mirror_path(&project).join("HEAD").exists());
    let entries = std::fs::read_dir(cache.path()).unwrap().count();
    assert_eq!(entries, 1);
}

#[tokio::test]
async fn test_branches_listed() {
    let repo = FixtureRepo::new();
    let cache = tempfile::tempdir().unwrap();
    let resolver = GitCommitResolver::new(cache.path());

    let branches = resolver.branches(&project(&repo.url())).await.unwrap();
    assert_eq!(branches, vec!["master".to_string(), "topic".to_string()]);
}

#[tokio::test]
async fn test_resolve_picks_up_new_commits() {
    let mut repo = FixtureRepo::new();
    let cache = tempfile::tempdir().unwrap();
    let resolver = GitCommitResolver::new(cache.path());
    let project = project(&repo.url());

    let before = resolver.resolve(&project, "master").await.unwrap();
    let newest = repo.commit_on_master("CHANGELOG");
    let after = resolver.resolve(&project, "master").await.unwrap();

    assert_ne!(before[0], newest);
    assert_eq!(after[0], newest);
}

#[tokio::test]
async fn test_history_depth_bounds_result() {
    let repo = FixtureRepo::new();
    let cache = tempfile::tempdir().unwrap();
    let config = GitConfig {
        cache_dir: cache.path().to_path_buf(),
        history_depth: 1,
        ..GitConfig::default()
    };
    let resolver = GitCommitResolver::from_config(&config);

    let hashes = resolver.resolve(&project(&repo.url()), "master").await.unwrap();
    assert_eq!(hashes, vec![repo.master[0].clone()]);
}

#[tokio::test]
async fn test_concurrent_resolves_share_one_mirror() {
    let repo = FixtureRepo::new();
    let cache = tempfile::tempdir().unwrap();
    let resolver = GitCommitResolver::new(cache.path());
    let project = project(&repo.url());

    let branches = ["master", "topic", "master", "no-branch", "topic"];
    let results = futures::future::join_all(
        branches.iter().map(|branch| resolver.resolve(&project, branch)),
    )
    .await;

    for (branch, result) in branches.iter().zip(results) {
        let hashes = result.unwrap();
        match *branch {
            "master" => assert_eq!(hashes[0], repo.master[0]),
            "topic" => assert_eq!(hashes[0], repo.topic_head),
            _ => assert!(hashes.is_empty()),
        }
    }
    assert_eq!(std::fs::read_dir(cache.path()).unwrap().count(), 1);
}
