// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Shell Deployer
//!
//! Keeps a working copy per project, checks out the pinned commit, and runs
//! the project's own deploy script from the working copy root.
//!
//! The script receives the actions as arguments and the deploy description
//! through environment variables:
//!
//! | Variable | Value |
//! |----------|-------|
//! | `DEPLOY_PROJECT` | project name |
//! | `DEPLOY_BRANCH` | branch |
//! | `DEPLOY_COMMIT` | full commit hash |
//! | `DEPLOY_ENV` / `DEPLOY_BOX` | target, when set |
//! | `DEPLOY_ACTIONS` | comma-joined actions, when set |
//! | `DEPLOY_VIA` | request origin |
//! | `DEPLOY_VAR_<KEY>` | each request variable |

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::commit::GitError;
use crate::domain::config::ShellDeployerConfig;
use crate::domain::deploy::{Deploy, DeployId, DeployParameters};
use crate::domain::deployer::{Deployer, DeployerError};
use crate::domain::project::{Project, ProjectName};
use crate::infrastructure::git::GitCli;

pub struct ShellDeployer {
    git: GitCli,
    workspace_dir: PathBuf,
    script: String,
    timeout: Duration,
    locks: DashMap<ProjectName, Arc<Mutex<()>>>,
}

impl ShellDeployer {
    pub fn new(workspace_dir: impl Into<PathBuf>, script: impl Into<String>) -> Self {
        Self {
            git: GitCli::default(),
            workspace_dir: workspace_dir.into(),
            script: script.into(),
            timeout: Duration::from_secs(1800),
            locks: DashMap::new(),
        }
    }

    pub fn from_config(config: &ShellDeployerConfig, git: GitCli) -> Self {
        Self::new(config.workspace_dir.clone(), config.script.clone())
            .with_git(git)
            .with_timeout(Duration::from_secs(config.timeout_secs))
    }

    pub fn with_git(mut self, git: GitCli) -> Self {
        self.git = git;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Working copy used for `project`
    pub fn working_copy(&self, project: &ProjectName) -> PathBuf {
        self.workspace_dir.join(project.as_str())
    }

    fn project_lock(&self, name: &ProjectName) -> Arc<Mutex<()>> {
        self.locks.entry(name.clone()).or_default().clone()
    }

    async fn checkout(&self, workdir: &Path, commit: &str) -> Result<(), DeployerError> {
        self.git
            .run_checked(
                Some(workdir),
                &["checkout", "--quiet", "--force", "--detach", commit],
            )
            .await?;
        debug!(commit = %commit, workdir = %workdir.display(), "Checked out commit");
        Ok(())
    }

    fn script_command(
        &self,
        workdir: &Path,
        deploy: &Deploy,
        params: &DeployParameters,
    ) -> Command {
        let mut cmd = Command::new(workdir.join(&self.script));
        cmd.current_dir(workdir)
            .env("DEPLOY_PROJECT", deploy.project.as_str())
            .env("DEPLOY_BRANCH", params.branch())
            .env("DEPLOY_COMMIT", &deploy.commit)
            .env("DEPLOY_VIA", &deploy.via)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(env) = params.env() {
            cmd.env("DEPLOY_ENV", env);
        }
        if let Some(box_name) = params.box_name() {
            cmd.env("DEPLOY_BOX", box_name);
        }
        if let Some(actions) = params.actions() {
            cmd.env("DEPLOY_ACTIONS", actions.join(","));
            cmd.args(actions);
        }
        for (key, value) in &deploy.variables {
            cmd.env(variable_env_name(key), value);
        }

        cmd
    }
}

#[async_trait]
impl Deployer for ShellDeployer {
    async fn setup(
        &self,
        project: &Project,
        _params: &DeployParameters,
    ) -> Result<(), DeployerError> {
        let lock = self.project_lock(&project.name);
        let _guard = lock.lock().await;

        let workdir = self.working_copy(&project.name);
        let url = project.repo_url.as_str();
        let source = local_or_remote(project);

        if workdir.join(".git").exists() {
            debug!(project = %project.name, "Refreshing working copy");
            // The project may have been re-pointed since the clone
            self.git
                .run_checked(Some(&workdir), &["remote", "set-url", "origin", &source])
                .await?;
            let fetch = self
                .git
                .run(Some(&workdir), &["fetch", "--prune", "--quiet", "origin"])
                .await?;
            if !fetch.success() {
                return Err(GitError::RepositoryInaccessible {
                    url: url.to_string(),
                    reason: fetch.stderr,
                }
                .into());
            }
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.workspace_dir).await?;
        if workdir.exists() {
            tokio::fs::remove_dir_all(&workdir).await?;
        }

        info!(project = %project.name, repo = %url, "Cloning working copy");

        let target = workdir.to_string_lossy().into_owned();
        let clone = self
            .git
            .run(None, &["clone", "--quiet", "--", &source, &target])
            .await?;

        if !clone.success() {
            return Err(GitError::RepositoryInaccessible {
                url: url.to_string(),
                reason: clone.stderr,
            }
            .into());
        }

        Ok(())
    }

    async fn execute(
        &self,
        deploy: &Deploy,
        params: &DeployParameters,
    ) -> Result<(), DeployerError> {
        let lock = self.project_lock(&deploy.project);
        let _guard = lock.lock().await;

        let workdir = self.working_copy(&deploy.project);
        if !workdir.join(".git").exists() {
            return Err(DeployerError::Configuration(format!(
                "no working copy for {}; setup has not run",
                deploy.project
            )));
        }

        self.checkout(&workdir, &deploy.commit).await?;

        let script = workdir.join(&self.script);
        if !script.is_file() {
            return Err(DeployerError::Configuration(format!(
                "deploy script {} not found at {}",
                self.script, deploy.commit
            )));
        }

        info!(
            deploy_id = %deploy.id,
            project = %deploy.project,
            script = %self.script,
            "Running deploy script"
        );

        let mut child = self.script_command(&workdir, deploy, params).spawn()?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let finished = tokio::time::timeout(self.timeout, async {
            let (status, _, _) = tokio::join!(
                child.wait(),
                log_output(stdout, deploy.id, OutputStream::Stdout),
                log_output(stderr, deploy.id, OutputStream::Stderr),
            );
            status
        })
        .await;

        let status = match finished {
            Ok(status) => status?,
            Err(_) => {
                warn!(deploy_id = %deploy.id, "Deploy script timed out");
                if let Err(e) = child.kill().await {
                    warn!(deploy_id = %deploy.id, "Failed to kill deploy script: {}", e);
                }
                return Err(DeployerError::Timeout(self.timeout.as_secs()));
            }
        };

        if !status.success() {
            return Err(DeployerError::CommandFailed {
                command: self.script.clone(),
                status: status.to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum OutputStream {
    Stdout,
    Stderr,
}

/// Log each line of the script's output as it arrives; returns the line count
async fn log_output<R>(reader: Option<R>, deploy_id: DeployId, stream: OutputStream) -> usize
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return 0;
    };

    let mut lines = BufReader::new(reader).lines();
    let mut count = 0;
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                count += 1;
                match stream {
                    OutputStream::Stdout => info!(deploy_id = %deploy_id, "{}", line),
                    OutputStream::Stderr => warn!(deploy_id = %deploy_id, "{}", line),
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!(deploy_id = %deploy_id, "Stopped reading script output: {}", e);
                break;
            }
        }
    }
    count
}

/// `DEPLOY_VAR_` plus the key upper-cased, anything outside `[A-Z0-9_]` as `_`
fn variable_env_name(key: &str) -> String {
    let key: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("DEPLOY_VAR_{}", key)
}

fn local_or_remote(project: &Project) -> String {
    if project.repo_url.is_remote() {
        return project.repo_url.to_string();
    }
    std::fs::canonicalize(project.repo_url.as_str())
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| project.repo_url.to_string())
}
