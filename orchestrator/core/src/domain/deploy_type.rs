// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Deploy Type - Registry key selecting a project's deployer adapter
//
// Free-form strings are validated once at the boundary so the registry only
// ever sees normalised keys ("shell", "ci", "mock", ...).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeployType(String);

impl DeployType {
    /// Parse and normalise a deploy type key
    ///
    /// Keys are case-insensitive, must start with a letter and may contain
    /// letters, digits, `-` and `_`.
    pub fn parse(raw: &str) -> Result<Self, DeployTypeError> {
        let key = raw.trim().to_ascii_lowercase();

        if key.is_empty() {
            return Err(DeployTypeError::Empty);
        }

        let mut chars = key.chars();
        let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
        let rest_valid = chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !starts_with_letter || !rest_valid {
            return Err(DeployTypeError::Invalid(raw.to_string()));
        }

        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeployType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DeployType {
    type Error = DeployTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DeployType> for String {
    fn from(value: DeployType) -> Self {
        value.0
    }
}

impl std::str::FromStr for DeployType {
    type Err = DeployTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeployTypeError {
    #[error("deploy type cannot be empty")]
    Empty,

    #[error("invalid deploy type {0:?}: expected a letter followed by letters, digits, '-' or '_'")]
    Invalid(String),
}
