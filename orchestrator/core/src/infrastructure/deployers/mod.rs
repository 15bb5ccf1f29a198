// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Deployer adapters and the registry that selects between them
//!
//! | Key | Adapter |
//! |-----|---------|
//! | `noop` | [`NoopDeployer`] accepts every deploy, runs nothing |
//! | `shell` | [`ShellDeployer`] runs the project's deploy script |
//! | `ci` | [`CiTriggerDeployer`] posts the deploy to a CI endpoint |
//!
//! [`MockDeployer`] records every call and is meant to be installed by tests
//! with [`DeployerRegistry::register_instance`].

pub mod ci;
pub mod mock;
pub mod noop;
pub mod registry;
pub mod shell;

pub use ci::CiTriggerDeployer;
pub use mock::MockDeployer;
pub use noop::NoopDeployer;
pub use registry::{factory, try_factory, DeployerFactory, DeployerRegistry, RegistryError};
pub use shell::ShellDeployer;
