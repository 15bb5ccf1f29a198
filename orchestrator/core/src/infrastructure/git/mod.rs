// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Git Infrastructure
//
// Shells out to the git executable. The commit resolver keeps bare mirrors;
// the shell deployer keeps working copies and reuses the same runner.

pub mod command;
pub mod resolver;

pub use command::{GitCli, GitOutput};
pub use resolver::GitCommitResolver;
