// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Deployer Registry - Maps deploy types to adapter factories
//
// Adapters are constructed lazily on first use and cached for the lifetime of
// the registration. Re-registering a key swaps in a fresh registration; deploys
// already holding the old Arc finish against it.
//
// Factories run outside the registry-wide lock. Only callers resolving the same
// registration wait on each other while it is being constructed.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::config::LaunchpadConfigManifest;
use crate::domain::deploy_type::DeployType;
use crate::domain::deployer::{Deployer, DeployerError};
use crate::infrastructure::git::GitCli;

use super::ci::CiTriggerDeployer;
use super::noop::NoopDeployer;
use super::shell::ShellDeployer;

/// Builds a deployer instance for one deploy type
pub type DeployerFactory =
    Arc<dyn Fn() -> Result<Arc<dyn Deployer>, DeployerError> + Send + Sync>;

struct Registration {
    factory: DeployerFactory,
    instance: Mutex<Option<Arc<dyn Deployer>>>,
}

impl Registration {
    fn lazy(factory: DeployerFactory) -> Self {
        Self {
            factory,
            instance: Mutex::new(None),
        }
    }

    fn get_or_construct(
        &self,
        deploy_type: &DeployType,
    ) -> Result<Arc<dyn Deployer>, RegistryError> {
        let mut instance = self.instance.lock();
        if let Some(existing) = instance.as_ref() {
            return Ok(existing.clone());
        }

        debug!("Constructing deployer for deploy type '{}'", deploy_type);
        let built = (self.factory)().map_err(|source| RegistryError::Construction {
            deploy_type: deploy_type.clone(),
            source,
        })?;
        *instance = Some(built.clone());
        Ok(built)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("no deployer registered for deploy type '{0}'")]
    NotRegistered(DeployType),

    #[error("failed to construct deployer '{deploy_type}': {source}")]
    Construction {
        deploy_type: DeployType,
        #[source]
        source: DeployerError,
    },
}

#[derive(Default)]
pub struct DeployerRegistry {
    entries: RwLock<HashMap<DeployType, Arc<Registration>>>,
}

impl DeployerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in adapters wired from configuration
    ///
    /// `noop` and `shell` are always available; `ci` only when an endpoint is
    /// configured.
    pub fn from_config(config: &LaunchpadConfigManifest) -> Self {
        let registry = Self::new();

        info!("Initializing deployer registry");

        registry.register(key("noop"), factory(NoopDeployer::new));

        let shell_config = config.spec.deployers.shell.clone();
        let git = GitCli::new(config.spec.git.binary.clone());
        registry.register(
            key("shell"),
            factory(move || ShellDeployer::from_config(&shell_config, git.clone())),
        );

        match &config.spec.deployers.ci {
            Some(ci_config) => {
                info!("Registering CI deployer for {}", ci_config.endpoint);
                let ci_config = ci_config.clone();
                registry.register(
                    key("ci"),
                    try_factory(move || CiTriggerDeployer::from_config(&ci_config)),
                );
            }
            None => debug!("No CI endpoint configured, skipping ci deployer"),
        }

        for deploy_type in config.referenced_deploy_types() {
            if !registry.is_registered(&deploy_type) {
                warn!(
                    "Deploy type '{}' is used by a project but has no deployer",
                    deploy_type
                );
            }
        }

        registry
    }

    /// Register (or replace) the factory for `deploy_type`
    pub fn register(&self, deploy_type: DeployType, factory: DeployerFactory) {
        self.insert(deploy_type, Registration::lazy(factory));
    }

    /// Register an already constructed adapter
    pub fn register_instance(&self, deploy_type: DeployType, deployer: Arc<dyn Deployer>) {
        let shared = deployer.clone();
        self.insert(
            deploy_type,
            Registration {
                factory: Arc::new(move || Ok(shared.clone())),
                instance: Mutex::new(Some(deployer)),
            },
        );
    }

    fn insert(&self, deploy_type: DeployType, registration: Registration) {
        let replaced = self
            .entries
            .write()
            .insert(deploy_type.clone(), Arc::new(registration))
            .is_some();

        if replaced {
            info!("Replaced deployer for deploy type '{}'", deploy_type);
        } else {
            debug!("Registered deployer for deploy type '{}'", deploy_type);
        }
    }

    /// Adapter for `deploy_type`, constructing it on first use
    ///
    /// The factory runs at most once per registration even under concurrent
    /// callers. A failed construction is not cached.
    pub fn resolve(&self, deploy_type: &DeployType) -> Result<Arc<dyn Deployer>, RegistryError> {
        let registration = self
            .entries
            .read()
            .get(deploy_type)
            .cloned()
            .ok_or_else(|| RegistryError::NotRegistered(deploy_type.clone()))?;

        registration.get_or_construct(deploy_type)
    }

    pub fn is_registered(&self, deploy_type: &DeployType) -> bool {
        self.entries.read().contains_key(deploy_type)
    }

    /// Registered keys, sorted
    pub fn registered_types(&self) -> Vec<DeployType> {
        let mut types: Vec<DeployType> = self.entries.read().keys().cloned().collect();
        types.sort();
        types
    }
}

impl std::fmt::Debug for DeployerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployerRegistry")
            .field("registered", &self.registered_types())
            .finish()
    }
}

/// Built-in keys are valid by construction
fn key(name: &'static str) -> DeployType {
    match DeployType::parse(name) {
        Ok(deploy_type) => deploy_type,
        Err(e) => unreachable!("built-in deploy type '{}' is invalid: {}", name, e),
    }
}

/// Shorthand for the common case of a factory wrapping a constructor
pub fn factory<D, F>(build: F) -> DeployerFactory
where
    D: Deployer + 'static,
    F: Fn() -> D + Send + Sync + 'static,
{
    Arc::new(move || Ok(Arc::new(build()) as Arc<dyn Deployer>))
}

/// Wrap a fallible constructor
pub fn try_factory<D, F>(build: F) -> DeployerFactory
where
    D: Deployer + 'static,
    F: Fn() -> Result<D, DeployerError> + Send + Sync + 'static,
{
    Arc::new(move || Ok(Arc::new(build()?) as Arc<dyn Deployer>))
}
