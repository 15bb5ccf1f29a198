// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod deployers;
pub mod event_bus;
pub mod git;
pub mod repositories;

pub use deployers::DeployerRegistry;
pub use event_bus::EventBus;
pub use git::GitCommitResolver;
pub use repositories::InMemoryProjectRepository;
