// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Thin async wrapper around the `git` executable.

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::debug;

use crate::domain::commit::GitError;

/// Captured result of one git invocation
#[derive(Debug)]
pub struct GitOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Non-empty stdout lines
    pub fn lines(&self) -> Vec<String> {
        self.stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct GitCli {
    binary: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Run git with `args`, optionally inside `dir`
    ///
    /// A non-zero exit is not an error here; callers decide what it means.
    /// Interactive credential prompts are disabled so an unauthenticated
    /// remote fails instead of hanging.
    pub async fn run(&self, dir: Option<&Path>, args: &[&str]) -> Result<GitOutput, GitError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_SSH_COMMAND", "ssh -o BatchMode=yes")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        debug!(command = ?cmd, "Running git");

        let output = cmd.output().await?;

        Ok(GitOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    /// Run git and turn a non-zero exit into [`GitError::CommandFailed`]
    pub async fn run_checked(
        &self,
        dir: Option<&Path>,
        args: &[&str],
    ) -> Result<GitOutput, GitError> {
        let output = self.run(dir, args).await?;
        if !output.success() {
            return Err(GitError::CommandFailed {
                command: args.first().copied().unwrap_or_default().to_string(),
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}
