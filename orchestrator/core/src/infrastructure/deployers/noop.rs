// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Noop Deployer - Accepts every deploy without touching anything
//
// Keeps no state between calls, so it is safe to leave registered in a
// long-running host. Useful for trying out a project before its real adapter
// exists.

use async_trait::async_trait;
use tracing::info;

use crate::domain::deploy::{Deploy, DeployParameters};
use crate::domain::deployer::{Deployer, DeployerError};

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDeployer;

impl NoopDeployer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Deployer for NoopDeployer {
    async fn execute(
        &self,
        deploy: &Deploy,
        _params: &DeployParameters,
    ) -> Result<(), DeployerError> {
        info!(
            deploy_id = %deploy.id,
            summary = %deploy.summary(),
            "Noop deploy: nothing executed"
        );
        Ok(())
    }
}
