// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Fixture repositories built with the git CLI

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Writes the deploy environment to `$DEPLOY_VAR_OUT`
const DEPLOY_SCRIPT: &str = r#"#!/bin/sh
set -e
out="${DEPLOY_VAR_OUT:-deploy.log}"
{
  echo "project=$DEPLOY_PROJECT"
  echo "branch=$DEPLOY_BRANCH"
  echo "commit=$DEPLOY_COMMIT"
  echo "env=$DEPLOY_ENV"
  echo "box=$DEPLOY_BOX"
  echo "actions=$DEPLOY_ACTIONS"
  echo "args=$*"
  echo "via=$DEPLOY_VIA"
} > "$out"
echo "deployed $DEPLOY_COMMIT"
"#;

pub struct FixtureRepo {
    pub dir: TempDir,
    /// master history, newest first
    pub master: Vec<String>,
    pub topic_head: String,
}

impl FixtureRepo {
    /// Repository with two commits on `master` and one more on `topic`
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path();

        git(path, &["init", "--quiet"]);
        git(path, &["symbolic-ref", "HEAD", "refs/heads/master"]);

        std::fs::create_dir_all(path.join("script")).unwrap();
        write_script(&path.join("script/deploy"));
        std::fs::write(path.join("README"), "demo\n").unwrap();
        let first = commit(path, "initial");

        std::fs::write(path.join("VERSION"), "1\n").unwrap();
        let second = commit(path, "bump version");

        git(path, &["checkout", "--quiet", "-b", "topic"]);
        std::fs::write(path.join("FEATURE"), "wip\n").unwrap();
        let topic_head = commit(path, "topic work");
        git(path, &["checkout", "--quiet", "master"]);

        Self {
            dir,
            master: vec![second, first],
            topic_head,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn url(&self) -> String {
        self.path().to_string_lossy().into_owned()
    }

    /// Add a commit to master and return its hash
    pub fn commit_on_master(&mut self, file: &str) -> String {
        std::fs::write(self.path().join(file), "change\n").unwrap();
        let hash = commit(self.dir.path(), file);
        self.master.insert(0, hash.clone());
        hash
    }

    /// Replace `script/deploy` on master and return the new head
    pub fn commit_deploy_script(&mut self, body: &str) -> String {
        let script = self.path().join("script/deploy");
        std::fs::write(&script, body).unwrap();
        make_executable(&script);
        let hash = commit(self.dir.path(), "replace deploy script");
        self.master.insert(0, hash.clone());
        hash
    }
}

pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=Launchpad Test",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn commit(dir: &Path, message: &str) -> String {
    git(dir, &["add", "--all"]);
    git(dir, &["commit", "--quiet", "-m", message]);
    git(dir, &["rev-parse", "HEAD"])
}

fn write_script(path: &PathBuf) {
    std::fs::write(path, DEPLOY_SCRIPT).unwrap();
    make_executable(path);
}

fn make_executable(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}
