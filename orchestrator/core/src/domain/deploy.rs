// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Deploy
//!
//! Request, record and canonical parameter set for a single deploy.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Value objects flowing through the deploy pipeline
//!
//! A [`DeployRequest`] is what a caller asks for. Once the orchestrator has
//! pinned the branch to a commit it becomes a [`Deploy`], from which the
//! [`DeployParameters`] handed to adapters and the human-readable summary are
//! derived.

use crate::domain::commit::ResolvedCommit;
use crate::domain::project::{Project, ProjectName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Branch used when the request does not name one
pub const DEFAULT_BRANCH: &str = "master";

/// Recorded when the caller does not say where the deploy came from
pub const DEFAULT_VIA: &str = "api";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeployId(pub Uuid);

impl DeployId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DeployId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeployId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Inbound deploy request, built once and not mutated by the pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployRequest {
    /// Project name to look up
    pub project: String,

    /// Branch to deploy; `None` or blank means [`DEFAULT_BRANCH`]
    #[serde(default)]
    pub branch: Option<String>,

    /// Ordered actions for the adapter (e.g. `migrate`, `restart`)
    #[serde(default)]
    pub actions: Vec<String>,

    /// Target environment
    #[serde(default)]
    pub environment: Option<String>,

    /// Target box inside the environment
    #[serde(default, rename = "box")]
    pub box_name: Option<String>,

    /// Opaque variables passed through to the adapter
    #[serde(default)]
    pub variables: BTreeMap<String, String>,

    /// Origin of the request (`web`, `api`, `cli`, ...)
    #[serde(default)]
    pub via: Option<String>,
}

impl DeployRequest {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            ..Default::default()
        }
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions = actions.into_iter().map(Into::into).collect();
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn box_name(mut self, box_name: impl Into<String>) -> Self {
        self.box_name = Some(box_name.into());
        self
    }

    pub fn variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn via(mut self, via: impl Into<String>) -> Self {
        self.via = Some(via.into());
        self
    }

    /// Requested branch, falling back to [`DEFAULT_BRANCH`]
    pub fn effective_branch(&self) -> &str {
        match self.branch.as_deref().map(str::trim) {
            Some(branch) if !branch.is_empty() => branch,
            _ => DEFAULT_BRANCH,
        }
    }
}

/// A deploy pinned to an exact commit
///
/// Owned by the caller's persistence layer once the pipeline hands it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deploy {
    pub id: DeployId,
    pub project: ProjectName,
    pub branch: String,
    pub commit: String,
    pub environment: Option<String>,
    #[serde(rename = "box")]
    pub box_name: Option<String>,
    pub actions: Vec<String>,
    pub variables: BTreeMap<String, String>,
    pub via: String,
    pub created_at: DateTime<Utc>,
}

impl Deploy {
    /// Pin a request to a resolved commit
    ///
    /// Blank actions are discarded and blank environment/box values count as
    /// unset. A box without an environment is kept here (so the record shows
    /// what was asked for) but never reaches [`DeployParameters`].
    pub fn from_request(
        project: &Project,
        request: &DeployRequest,
        commit: &ResolvedCommit,
    ) -> Self {
        Self {
            id: DeployId::new(),
            project: project.name.clone(),
            branch: commit.branch.clone(),
            commit: commit.hash.clone(),
            environment: non_blank(request.environment.as_deref()),
            box_name: non_blank(request.box_name.as_deref()),
            actions: request
                .actions
                .iter()
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect(),
            variables: request.variables.clone(),
            via: non_blank(request.via.as_deref()).unwrap_or_else(|| DEFAULT_VIA.to_string()),
            created_at: Utc::now(),
        }
    }

    /// Canonical parameter set for adapters
    pub fn parameters(&self) -> DeployParameters {
        DeployParameters::new(
            self.branch.clone(),
            self.actions.clone(),
            self.environment.clone(),
            self.box_name.clone(),
        )
        .with_metadata("via", self.via.clone())
    }

    /// Human-readable description of what is being deployed
    ///
    /// `executing deploy[/action...] <project>/<branch>/<hash>[ to <env>[/<box>]]`
    pub fn summary(&self) -> String {
        let mut summary = String::from("executing deploy");

        for action in &self.actions {
            summary.push('/');
            summary.push_str(action);
        }

        summary.push_str(&format!(" {}/{}/{}", self.project, self.branch, self.commit));

        if let Some(environment) = &self.environment {
            summary.push_str(&format!(" to {}", environment));

            if let Some(box_name) = &self.box_name {
                summary.push_str(&format!("/{}", box_name));
            }
        }

        summary
    }
}

/// Parameters handed to [`crate::domain::deployer::Deployer`] implementations
///
/// `box` is never present without `env`; `actions` only when non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployParameters {
    branch: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    actions: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    env: Option<String>,

    #[serde(default, rename = "box", skip_serializing_if = "Option::is_none")]
    box_name: Option<String>,

    #[serde(flatten)]
    metadata: BTreeMap<String, String>,
}

impl DeployParameters {
    pub fn new(
        branch: impl Into<String>,
        actions: Vec<String>,
        env: Option<String>,
        box_name: Option<String>,
    ) -> Self {
        if env.is_none() {
            if let Some(box_name) = &box_name {
                tracing::warn!(box_name = %box_name, "Ignoring box without an environment");
            }
        }

        let box_name = env.as_ref().and(box_name);

        Self {
            branch: branch.into(),
            actions: if actions.is_empty() { None } else { Some(actions) },
            env,
            box_name,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach caller metadata such as `via`
    ///
    /// Reserved keys are ignored so metadata cannot shadow the canonical fields.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        if !matches!(key.as_str(), "branch" | "actions" | "env" | "box") {
            self.metadata.insert(key, value.into());
        }
        self
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn actions(&self) -> Option<&[String]> {
        self.actions.as_deref()
    }

    pub fn env(&self) -> Option<&str> {
        self.env.as_deref()
    }

    pub fn box_name(&self) -> Option<&str> {
        self.box_name.as_deref()
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
