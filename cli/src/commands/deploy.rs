// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `launchpad deploy` - run one deploy through the pipeline

use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;

use launchpad_core::domain::deploy::DeployRequest;

use super::{build_orchestrator, load_config};

#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Project name
    pub project: String,

    /// Branch to deploy (default: master)
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Comma-separated actions, passed to the adapter in order
    #[arg(short, long, value_delimiter = ',')]
    pub actions: Vec<String>,

    /// Target environment
    #[arg(short, long)]
    pub environment: Option<String>,

    /// Target box within the environment
    #[arg(long = "box", value_name = "BOX")]
    pub box_name: Option<String>,

    /// Extra variable handed to the adapter (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub variables: Vec<(String, String)>,

    /// Origin recorded on the deploy
    #[arg(long, default_value = "cli")]
    pub via: String,

    /// Resolve the commit and print the summary without dispatching
    #[arg(long)]
    pub dry_run: bool,
}

impl DeployArgs {
    pub fn to_request(&self) -> DeployRequest {
        let mut request = DeployRequest::new(self.project.clone())
            .actions(self.actions.iter().cloned())
            .via(self.via.clone());

        if let Some(branch) = &self.branch {
            request = request.branch(branch.clone());
        }
        if let Some(environment) = &self.environment {
            request = request.environment(environment.clone());
        }
        if let Some(box_name) = &self.box_name {
            request = request.box_name(box_name.clone());
        }
        for (key, value) in &self.variables {
            request = request.variable(key.clone(), value.clone());
        }

        request
    }
}

pub async fn handle_command(args: DeployArgs, config_override: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_override)?;
    let orchestrator = build_orchestrator(&config)?;
    let request = args.to_request();
    debug!(?request, "Deploy request");

    if args.dry_run {
        let (_, deploy) = orchestrator
            .prepare(&request)
            .await
            .map_err(|e| anyhow!("{} [{}]", e, e.kind()))?;
        println!("{} {}", "(dry run)".dimmed(), deploy.summary());
        return Ok(());
    }

    let outcome = orchestrator.deploy(request).await;

    match outcome.error() {
        None => {
            if let Some(summary) = &outcome.summary {
                println!("{} {}", "✓".green(), summary);
            }
            if let Some(deploy) = &outcome.deploy {
                println!("  Deploy ID: {}", deploy.id);
            }
            Ok(())
        }
        Some(error) => {
            if let Some(summary) = &outcome.summary {
                eprintln!("{} {}", "✗".red(), summary);
            }
            Err(anyhow!("{} [{}]", error, error.kind()))
        }
    }
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty variable name in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: DeployArgs,
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("release=v1=final").unwrap(),
            ("release".to_string(), "v1=final".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_request_from_flags() {
        let cli = TestCli::parse_from([
            "deploy",
            "demo",
            "--actions",
            "migrate,restart",
            "-e",
            "staging",
            "--box",
            "web1",
            "--var",
            "tag=v2",
        ]);
        let request = cli.args.to_request();

        assert_eq!(request.project, "demo");
        assert_eq!(request.effective_branch(), "master");
        assert_eq!(request.actions, vec!["migrate", "restart"]);
        assert_eq!(request.environment.as_deref(), Some("staging"));
        assert_eq!(request.box_name.as_deref(), Some("web1"));
        assert_eq!(request.variables.get("tag").map(String::as_str), Some("v2"));
        assert_eq!(request.via.as_deref(), Some("cli"));
    }
}
