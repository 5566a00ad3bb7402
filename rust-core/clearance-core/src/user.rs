// SPDX-License-Identifier: PMPL-1.0-or-later
//! The authenticated user as seen by the permission layer.
//!
//! Users are owned by the auth subsystem; only the fields that influence
//! permission checks are modelled here.

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// A user record with an optional role string.
///
/// The role is kept as the raw string supplied by the auth subsystem so that
/// unrecognised roles can be displayed and evaluated (they hold no
/// catalogued keys) instead of being rejected at the boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub role: Option<String>,
    /// Lets a user without the manager tier mark jobs complete.
    #[serde(default, rename = "canSetJobComplete", alias = "can_set_job_complete")]
    pub can_set_job_complete: bool,
}

impl User {
    /// User with a role string.
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Some(role.into()),
            can_set_job_complete: false,
        }
    }

    /// User whose record carries no role.
    pub fn without_role(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: None,
            can_set_job_complete: false,
        }
    }

    pub fn with_job_complete(mut self, allowed: bool) -> Self {
        self.can_set_job_complete = allowed;
        self
    }

    /// The role string, treating an empty string as absent.
    pub fn role_str(&self) -> Option<&str> {
        self.role.as_deref().filter(|r| !r.is_empty())
    }

    /// The role, or `None` if absent or not exactly a role's wire name.
    pub fn parsed_role(&self) -> Option<Role> {
        self.role_str().and_then(Role::from_wire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_role() {
        assert_eq!(User::new("u1", "manager").parsed_role(), Some(Role::Manager));
        assert_eq!(User::new("u1", "contractor").parsed_role(), None);
        assert_eq!(User::without_role("u1").parsed_role(), None);
    }

    #[test]
    fn test_parsed_role_is_case_and_space_sensitive() {
        assert_eq!(User::new("u1", "ADMIN").parsed_role(), None);
        assert_eq!(User::new("u1", "Admin").parsed_role(), None);
        assert_eq!(User::new("u1", " manager ").parsed_role(), None);
    }

    #[test]
    fn test_empty_role_string_counts_as_absent() {
        let user = User::new("u1", "");
        assert_eq!(user.role_str(), None);
    }

    #[test]
    fn test_user_deserializes_from_auth_payload() {
        let user: User =
            serde_json::from_str(r#"{"id":"u7","role":"employee","canSetJobComplete":true}"#)
                .unwrap();
        assert_eq!(user.role_str(), Some("employee"));
        assert!(user.can_set_job_complete);

        let user: User = serde_json::from_str(r#"{"id":"u8"}"#).unwrap();
        assert_eq!(user.role, None);
        assert!(!user.can_set_job_complete);
    }
}
