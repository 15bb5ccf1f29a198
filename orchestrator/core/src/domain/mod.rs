// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Value objects and ports of the deploy core.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Projects, deploys, and the commit-resolver / deployer contracts

pub mod commit;
pub mod config;
pub mod deploy;
pub mod deploy_type;
pub mod deployer;
pub mod events;
pub mod project;
pub mod repository;
