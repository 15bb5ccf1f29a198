// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// CI Trigger Deployer - Hands the deploy off to a remote CI system
//
// Execute posts the deploy as JSON to a configured endpoint; the CI system is
// expected to check out the commit itself. Setup is the default no-op.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::domain::config::CiDeployerConfig;
use crate::domain::deploy::{Deploy, DeployParameters};
use crate::domain::deployer::{Deployer, DeployerError};

pub struct CiTriggerDeployer {
    client: Client,
    endpoint: Url,
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct TriggerPayload<'a> {
    deploy_id: String,
    project: &'a str,
    commit: &'a str,
    via: &'a str,
    parameters: &'a DeployParameters,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    variables: &'a BTreeMap<String, String>,
}

impl CiTriggerDeployer {
    pub fn new(
        endpoint: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DeployerError> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            DeployerError::Configuration(format!("invalid CI endpoint '{}': {}", endpoint, e))
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DeployerError::Configuration(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn from_config(config: &CiDeployerConfig) -> Result<Self, DeployerError> {
        let token = Self::resolve_token(&config.token)?;
        Self::new(
            &config.endpoint,
            token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Resolve `env:VAR` references, pass literal tokens through
    fn resolve_token(token: &Option<String>) -> Result<Option<String>, DeployerError> {
        match token {
            Some(t) => match t.strip_prefix("env:") {
                Some(var_name) => std::env::var(var_name).map(Some).map_err(|_| {
                    DeployerError::Configuration(format!(
                        "Environment variable not set: {}",
                        var_name
                    ))
                }),
                None => Ok(Some(t.clone())),
            },
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Deployer for CiTriggerDeployer {
    async fn execute(
        &self,
        deploy: &Deploy,
        params: &DeployParameters,
    ) -> Result<(), DeployerError> {
        let payload = TriggerPayload {
            deploy_id: deploy.id.to_string(),
            project: deploy.project.as_str(),
            commit: &deploy.commit,
            via: &deploy.via,
            parameters: params,
            variables: &deploy.variables,
        };

        let mut request = self.client.post(self.endpoint.clone()).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        info!(
            deploy_id = %deploy.id,
            endpoint = %self.endpoint,
            "Triggering CI deploy"
        );

        let response = request
            .send()
            .await
            .map_err(|e| DeployerError::Remote(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(deploy_id = %deploy.id, status = %status, "CI trigger rejected");
            return Err(DeployerError::Remote(format!("{}: {}", status, body.trim())));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commit::ResolvedCommit;
    use crate::domain::deploy::DeployRequest;
    use crate::domain::project::Project;
    use mockito::Matcher;

    fn deploy() -> Deploy {
        let project = Project::parse("webapp", "git@example.com:org/webapp.git", "ci").unwrap();
        let request = DeployRequest::new("webapp")
            .branch("topic")
            .actions(vec!["migrate".to_string()])
            .environment("staging")
            .variable("release", "42");
        let commit = ResolvedCommit {
            branch: "topic".into(),
            hash: "0123456789abcdef".into(),
        };
        Deploy::from_request(&project, &request, &commit)
    }

    #[test]
    fn test_rejects_invalid_endpoint() {
        let result = CiTriggerDeployer::new("not a url", None, Duration::from_secs(5));
        assert!(matches!(result, Err(DeployerError::Configuration(_))));
    }

    #[test]
    fn test_token_from_missing_env_var_fails() {
        let token = Some("env:LAUNCHPAD_TEST_TOKEN_THAT_IS_NOT_SET".to_string());
        assert!(CiTriggerDeployer::resolve_token(&token).is_err());
        assert_eq!(
            CiTriggerDeployer::resolve_token(&Some("literal".into())).unwrap(),
            Some("literal".to_string())
        );
    }

    #[tokio::test]
    async fn test_execute_posts_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/deploys")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "project": "webapp",
                "commit": "0123456789abcdef",
                "parameters": {
                    "branch": "topic",
                    "actions": ["migrate"],
                    "env": "staging"
                },
                "variables": { "release": "42" }
            })))
            .with_status(201)
            .create_async()
            .await;

        let deployer = CiTriggerDeployer::new(
            &format!("{}/deploys", server.url()),
            Some("secret".into()),
            Duration::from_secs(5),
        )
        .unwrap();

        let deploy = deploy();
        deployer.execute(&deploy, &deploy.parameters()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_remote_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/deploys")
            .with_status(503)
            .with_body("pipeline busy")
            .create_async()
            .await;

        let deployer = CiTriggerDeployer::new(
            &format!("{}/deploys", server.url()),
            None,
            Duration::from_secs(5),
        )
        .unwrap();

        let deploy = deploy();
        let err = deployer.execute(&deploy, &deploy.parameters()).await.unwrap_err();
        match err {
            DeployerError::Remote(msg) => assert!(msg.contains("pipeline busy")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
