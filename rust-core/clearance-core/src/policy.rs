// SPDX-License-Identifier: PMPL-1.0-or-later
//! How the evaluator treats keys that are not in the registry.

use serde::{Deserialize, Serialize};

use crate::error::PermissionError;

/// Policy for permission keys missing from the registry.
///
/// `Allow` keeps call sites that pass not-yet-catalogued keys working, at the
/// cost that a mistyped key silently disables enforcement. `Deny` fails
/// closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPermissionPolicy {
    #[default]
    Allow,
    Deny,
}

impl UnknownPermissionPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            UnknownPermissionPolicy::Allow => "allow",
            UnknownPermissionPolicy::Deny => "deny",
        }
    }
}

impl std::fmt::Display for UnknownPermissionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UnknownPermissionPolicy {
    type Err = PermissionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(UnknownPermissionPolicy::Allow),
            "deny" => Ok(UnknownPermissionPolicy::Deny),
            _ => Err(PermissionError::InvalidPolicy(value.to_string())),
        }
    }
}

/// Serializable evaluator settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub unknown_permission_policy: UnknownPermissionPolicy,
}
