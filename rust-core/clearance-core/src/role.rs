// SPDX-License-Identifier: PMPL-1.0-or-later
//! User roles.

use serde::{Deserialize, Serialize};

use crate::error::PermissionError;

/// One of the four application roles.
///
/// Roles are ordered by privilege (`Employee < Manager < Admin < SuperAdmin`),
/// but each role's permission set is still resolved through the
/// [`RoleTable`](crate::RoleTable); the order is only used for tier
/// accumulation and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    Manager,
    Admin,
    SuperAdmin,
}

impl Role {
    /// All roles, least privileged first.
    pub const ALL: [Role; 4] = [Role::Employee, Role::Manager, Role::Admin, Role::SuperAdmin];

    /// Wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Manager => "manager",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Exact match on the wire name.
    ///
    /// Role strings from user records are resolved with this; a string that
    /// differs only by case or padding is not a role.
    pub fn from_wire(value: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.as_str() == value)
    }

    /// Privilege rank, 0 for employees.
    pub fn rank(self) -> u8 {
        match self {
            Role::Employee => 0,
            Role::Manager => 1,
            Role::Admin => 2,
            Role::SuperAdmin => 3,
        }
    }

    /// Whether this role sits at or above `other` in the privilege order.
    pub fn includes(self, other: Role) -> bool {
        self.rank() >= other.rank()
    }

    /// Whether this role is granted the whole catalog.
    pub fn has_full_access(self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lenient parse for operator input (CLI flags): ignores case and padding.
impl std::str::FromStr for Role {
    type Err = PermissionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "employee" => Ok(Role::Employee),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            _ => Err(PermissionError::UnknownRole(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_string_roundtrip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
            assert_eq!(role.to_string(), role.as_str());
        }
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("Manager".parse::<Role>(), Ok(Role::Manager));
        assert_eq!(" SUPER_ADMIN ".parse::<Role>(), Ok(Role::SuperAdmin));
    }

    #[test]
    fn test_from_wire_is_exact() {
        for role in Role::ALL {
            assert_eq!(Role::from_wire(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_wire("ADMIN"), None);
        assert_eq!(Role::from_wire("Admin"), None);
        assert_eq!(Role::from_wire(" manager "), None);
        assert_eq!(Role::from_wire(""), None);
    }

    #[test]
    fn test_role_parse_rejects_unknown() {
        let err = "contractor".parse::<Role>().unwrap_err();
        assert_eq!(err, PermissionError::UnknownRole("contractor".to_string()));
        assert!("superadmin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_privilege_order() {
        assert!(Role::SuperAdmin.includes(Role::Admin));
        assert!(Role::Admin.includes(Role::Manager));
        assert!(Role::Manager.includes(Role::Employee));
        assert!(!Role::Employee.includes(Role::Manager));
        assert!(Role::Employee < Role::SuperAdmin);
    }

    #[test]
    fn test_full_access_roles() {
        assert!(Role::Admin.has_full_access());
        assert!(Role::SuperAdmin.has_full_access());
        assert!(!Role::Manager.has_full_access());
        assert!(!Role::Employee.has_full_access());
    }

    #[test]
    fn test_role_serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"super_admin\"");
        let role: Role = serde_json::from_str("\"manager\"").unwrap();
        assert_eq!(role, Role::Manager);
    }
}
