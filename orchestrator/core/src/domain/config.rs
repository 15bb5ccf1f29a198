// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Launchpad Configuration Types
//
// Defines the configuration schema for a launchpad host, including:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Commit resolver cache settings
// - Built-in deployer adapter settings (shell, ci)
// - Declared projects (name, repository, deploy type)
// - Logging defaults

use crate::domain::deploy_type::DeployType;
use crate::domain::project::Project;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

pub const API_VERSION: &str = "launchpad/v1";
pub const KIND: &str = "LaunchpadConfig";

/// Top-level Kubernetes-style configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchpadConfigManifest {
    /// API version (must be "launchpad/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "LaunchpadConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: LaunchpadConfigSpec,
}

/// Manifest metadata (Kubernetes-style)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable host name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

/// Configuration specification (content under spec:)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchpadConfigSpec {
    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub deployers: DeployersConfig,

    #[serde(default)]
    pub projects: Vec<ProjectConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Commit resolver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Directory holding one mirror per project
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Maximum number of hashes returned per branch query
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,

    /// git executable
    #[serde(default = "default_git_binary")]
    pub binary: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployersConfig {
    #[serde(default)]
    pub shell: ShellDeployerConfig,

    /// CI trigger adapter; only registered when configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci: Option<CiDeployerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellDeployerConfig {
    /// Directory holding one working copy per project
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,

    /// Script to run, relative to the working copy root
    #[serde(default = "default_script")]
    pub script: String,

    /// Kill the script after this many seconds
    #[serde(default = "default_shell_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CiDeployerConfig {
    /// Webhook URL receiving deploy triggers
    pub endpoint: String,

    /// Bearer token (supports "env:VAR_NAME" for environment variables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default = "default_ci_timeout")]
    pub timeout_secs: u64,
}

/// Project declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub repo_url: String,
    pub deploy_type: String,
}

impl ProjectConfig {
    pub fn to_project(&self) -> anyhow::Result<Project> {
        Project::parse(&self.name, &self.repo_url, &self.deploy_type)
            .map_err(|e| anyhow::anyhow!("Invalid project '{}': {}", self.name, e))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".launchpad/repos")
}

fn default_history_depth() -> usize {
    20
}

fn default_git_binary() -> String {
    "git".to_string()
}

fn default_workspace_dir() -> PathBuf {
    PathBuf::from(".launchpad/workspaces")
}

fn default_script() -> String {
    "script/deploy".to_string()
}

fn default_shell_timeout() -> u64 {
    1800
}

fn default_ci_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            history_depth: default_history_depth(),
            binary: default_git_binary(),
        }
    }
}

impl Default for ShellDeployerConfig {
    fn default() -> Self {
        Self {
            workspace_dir: default_workspace_dir(),
            script: default_script(),
            timeout_secs: default_shell_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for LaunchpadConfigManifest {
    fn default() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "launchpad".to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: hostname,
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: LaunchpadConfigSpec::default(),
        }
    }
}

impl LaunchpadConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. LAUNCHPAD_CONFIG_PATH environment variable
    /// 2. ./launchpad-config.yaml (working directory)
    /// 3. ~/.launchpad/config.yaml (user home)
    /// 4. /etc/launchpad/config.yaml (system, Unix) or C:\ProgramData\Launchpad\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("LAUNCHPAD_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./launchpad-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".launchpad").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/launchpad/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\Launchpad\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using empty defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("LAUNCHPAD_GIT_CACHE_DIR") {
            if dir.trim().is_empty() {
                tracing::warn!("Ignoring empty LAUNCHPAD_GIT_CACHE_DIR");
            } else {
                tracing::info!("Environment override: LAUNCHPAD_GIT_CACHE_DIR={}", dir);
                self.spec.git.cache_dir = PathBuf::from(dir);
            }
        }

        if let Ok(level) = std::env::var("LAUNCHPAD_LOG_LEVEL") {
            match level.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    self.spec.logging.level = level.to_lowercase();
                }
                _ => {
                    tracing::warn!(
                        "Invalid value for LAUNCHPAD_LOG_LEVEL: '{}'. Expected trace/debug/info/warn/error. Ignoring.",
                        level
                    );
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.git.history_depth == 0 {
            anyhow::bail!("spec.git.history_depth must be at least 1");
        }

        if self.spec.git.binary.trim().is_empty() {
            anyhow::bail!("spec.git.binary cannot be empty");
        }

        if self.spec.deployers.shell.script.trim().is_empty() {
            anyhow::bail!("spec.deployers.shell.script cannot be empty");
        }

        if let Some(ci) = &self.spec.deployers.ci {
            if ci.endpoint.trim().is_empty() {
                anyhow::bail!("spec.deployers.ci.endpoint cannot be empty");
            }
        }

        let mut seen = HashSet::new();
        for project in &self.spec.projects {
            let parsed = project.to_project()?;
            if !seen.insert(parsed.name.clone()) {
                anyhow::bail!("Duplicate project name: {}", parsed.name);
            }
        }

        Ok(())
    }

    /// All declared projects, validated
    pub fn projects(&self) -> anyhow::Result<Vec<Project>> {
        self.spec.projects.iter().map(ProjectConfig::to_project).collect()
    }

    /// Declare a new project
    ///
    /// Name, repository URL and deploy type are all required; a project with
    /// the same name must not already exist.
    pub fn add_project(
        &mut self,
        name: &str,
        repo_url: &str,
        deploy_type: &str,
    ) -> anyhow::Result<Project> {
        let project = Project::parse(name, repo_url, deploy_type)
            .map_err(|e| anyhow::anyhow!("Cannot set up project '{}': {}", name, e))?;

        let exists = self
            .spec
            .projects
            .iter()
            .any(|p| p.name.trim() == project.name.as_str());
        if exists {
            anyhow::bail!("Project '{}' already exists", project.name);
        }

        self.spec.projects.push(ProjectConfig {
            name: project.name.to_string(),
            repo_url: project.repo_url.to_string(),
            deploy_type: project.deploy_type.to_string(),
        });

        Ok(project)
    }

    /// Deploy types referenced by declared projects
    pub fn referenced_deploy_types(&self) -> Vec<DeployType> {
        let mut types: Vec<DeployType> = self
            .spec
            .projects
            .iter()
            .filter_map(|p| DeployType::parse(&p.deploy_type).ok())
            .collect();
        types.sort();
        types.dedup();
        types
    }
}
