// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for the permission layer.
//!
//! Evaluation itself never fails: every check degrades to a boolean. These
//! errors cover construction and parsing (role strings, tier tables, policy
//! names) and illegal navigation-guard transitions.

use thiserror::Error;

/// Errors raised while building or parsing permission data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// A role string did not name one of the four known roles.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// A role tier referenced a key that is missing from the registry.
    #[error("Tier for role '{role}' references uncatalogued permission '{key}'")]
    UncataloguedTierKey { role: String, key: String },

    /// The unknown-permission policy string was neither `allow` nor `deny`.
    #[error("Invalid unknown-permission policy '{0}' (expected 'allow' or 'deny')")]
    InvalidPolicy(String),

    /// A navigation event was applied in a state that does not accept it.
    #[error("Invalid navigation transition: cannot {event} while {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
}

/// Convenience alias used throughout the crate.
pub type PermissionResult<T> = Result<T, PermissionError>;
