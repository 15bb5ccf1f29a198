// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Git-backed commit resolver
//!
//! Each project gets a bare mirror under the cache directory. The first call
//! clones it; later calls fetch into it. Clone/fetch for one project is
//! serialised by a per-project async mutex, while ref queries against an
//! already materialised mirror run without holding it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::command::GitCli;
use crate::domain::commit::{CommitResolver, GitError};
use crate::domain::config::GitConfig;
use crate::domain::project::{Project, ProjectName};

pub struct GitCommitResolver {
    git: GitCli,
    cache_dir: PathBuf,
    history_depth: usize,
    locks: DashMap<ProjectName, Arc<Mutex<()>>>,
}

impl GitCommitResolver {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            git: GitCli::default(),
            cache_dir: cache_dir.into(),
            history_depth: 20,
            locks: DashMap::new(),
        }
    }

    pub fn from_config(config: &GitConfig) -> Self {
        Self::new(config.cache_dir.clone())
            .with_git(GitCli::new(config.binary.clone()))
            .with_history_depth(config.history_depth)
    }

    pub fn with_git(mut self, git: GitCli) -> Self {
        self.git = git;
        self
    }

    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.history_depth = depth.max(1);
        self
    }

    /// Location of the project's mirror
    pub fn mirror_path(&self, project: &Project) -> PathBuf {
        self.cache_dir.join(format!("{}.git", project.name))
    }

    fn project_lock(&self, name: &ProjectName) -> Arc<Mutex<()>> {
        self.locks.entry(name.clone()).or_default().clone()
    }

    /// Clone the mirror if missing, otherwise fetch into it
    async fn materialize(&self, project: &Project) -> Result<PathBuf, GitError> {
        let lock = self.project_lock(&project.name);
        let _guard = lock.lock().await;

        let mirror = self.mirror_path(project);
        let source = source_url(project);
        let url = source.as_str();

        if mirror.join("HEAD").exists() {
            debug!(project = %project.name, "Refreshing repository mirror");
            self.git
                .run_checked(Some(&mirror), &["remote", "set-url", "origin", url])
                .await?;

            let fetch = self
                .git
                .run(Some(&mirror), &["fetch", "--prune", "--quiet", "origin"])
                .await?;
            if !fetch.success() {
                warn!(project = %project.name, stderr = %fetch.stderr, "Fetch failed");
                return Err(inaccessible(url, fetch.stderr));
            }
            return Ok(mirror);
        }

        tokio::fs::create_dir_all(&self.cache_dir).await?;
        if mirror.exists() {
            // Leftover from an interrupted clone
            tokio::fs::remove_dir_all(&mirror).await?;
        }

        info!(project = %project.name, repo = %url, "Cloning repository mirror");

        let mirror_arg = path_arg(&mirror);
        let clone = self
            .git
            .run(None, &["clone", "--mirror", "--quiet", "--", url, &mirror_arg])
            .await?;

        if !clone.success() {
            warn!(project = %project.name, stderr = %clone.stderr, "Clone failed");
            if mirror.exists() {
                let _ = tokio::fs::remove_dir_all(&mirror).await;
            }
            return Err(inaccessible(url, clone.stderr));
        }

        Ok(mirror)
    }

    async fn branch_exists(&self, mirror: &Path, branch: &str) -> Result<bool, GitError> {
        let reference = format!("refs/heads/{}", branch);
        let output = self
            .git
            .run(Some(mirror), &["show-ref", "--verify", "--quiet", &reference])
            .await?;

        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ if output.stderr.is_empty() => Ok(false),
            _ => Err(GitError::CommandFailed {
                command: "show-ref".to_string(),
                stderr: output.stderr,
            }),
        }
    }
}

#[async_trait]
impl CommitResolver for GitCommitResolver {
    async fn setup(&self, project: &Project) -> Result<(), GitError> {
        self.materialize(project).await.map(|_| ())
    }

    async fn resolve(&self, project: &Project, branch: &str) -> Result<Vec<String>, GitError> {
        let mirror = self.materialize(project).await?;

        let branch = branch.trim();
        if branch.is_empty() || !self.branch_exists(&mirror, branch).await? {
            debug!(project = %project.name, branch = %branch, "Branch not found");
            return Ok(Vec::new());
        }

        let max_count = format!("--max-count={}", self.history_depth);
        let reference = format!("refs/heads/{}", branch);
        let output = self
            .git
            .run_checked(Some(&mirror), &["rev-list", &max_count, &reference, "--"])
            .await?;

        let hashes = output.lines();
        debug!(
            project = %project.name,
            branch = %branch,
            count = hashes.len(),
            "Resolved branch"
        );
        Ok(hashes)
    }

    async fn branches(&self, project: &Project) -> Result<Vec<String>, GitError> {
        let mirror = self.materialize(project).await?;

        let output = self
            .git
            .run_checked(
                Some(&mirror),
                &["for-each-ref", "--format=%(refname:short)", "refs/heads/"],
            )
            .await?;

        let mut branches = output.lines();
        branches.sort();
        Ok(branches)
    }
}

fn inaccessible(url: &str, stderr: String) -> GitError {
    let reason = if stderr.is_empty() {
        "git exited with an error".to_string()
    } else {
        stderr
    };
    GitError::RepositoryInaccessible {
        url: url.to_string(),
        reason,
    }
}

/// Local repositories are addressed by absolute path so the mirror's origin
/// stays valid regardless of the directory git later runs in
fn source_url(project: &Project) -> String {
    let location = &project.repo_url;
    if location.is_remote() {
        return location.to_string();
    }
    std::fs::canonicalize(location.as_str())
        .map(|p| path_arg(&p))
        .unwrap_or_else(|_| location.to_string())
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
