// SPDX-License-Identifier: PMPL-1.0-or-later
//! Declarative gates.
//!
//! A [`PermissionGate`] decides whether guarded content is produced for the
//! current [`Access`]; a [`RouteGate`] makes the same decision for a whole
//! route and names where to send the user instead.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::access::Access;

/// Where a denied route sends the user unless configured otherwise.
pub const DEFAULT_FALLBACK_PATH: &str = "/dashboard";

/// Renders guarded content only when the permission check passes.
///
/// With no required permissions the gate always passes, whoever the user is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGate {
    #[serde(default, rename = "requiredPermissions", alias = "required_permissions")]
    pub required_permissions: Vec<String>,
    /// `false` means any one of the keys is enough.
    #[serde(default, rename = "requireAll", alias = "require_all")]
    pub require_all: bool,
}

impl PermissionGate {
    /// Gate passing when any of `keys` is held.
    pub fn any_of<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_permissions: keys.into_iter().map(Into::into).collect(),
            require_all: false,
        }
    }

    /// Gate passing only when all of `keys` are held.
    pub fn all_of<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_permissions: keys.into_iter().map(Into::into).collect(),
            require_all: true,
        }
    }

    /// Gate with no requirement.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn allows(&self, access: &Access) -> bool {
        if self.required_permissions.is_empty() {
            return true;
        }
        if self.require_all {
            access.can_all(&self.required_permissions)
        } else {
            access.can_any(&self.required_permissions)
        }
    }

    /// `children()` when allowed, otherwise `fallback` (nothing by default).
    pub fn render<T>(&self, access: &Access, children: impl FnOnce() -> T, fallback: Option<T>) -> Option<T> {
        if self.allows(access) {
            Some(children())
        } else {
            fallback
        }
    }
}

/// Outcome of a [`RouteGate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Render,
    Redirect(String),
}

/// Route-level gate redirecting to a fallback path on denial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGate {
    pub gate: PermissionGate,
    pub fallback_path: String,
}

impl RouteGate {
    pub fn new(gate: PermissionGate) -> Self {
        Self {
            gate,
            fallback_path: DEFAULT_FALLBACK_PATH.to_string(),
        }
    }

    pub fn with_fallback(mut self, path: impl Into<String>) -> Self {
        self.fallback_path = path.into();
        self
    }

    pub fn decide(&self, access: &Access) -> RouteDecision {
        if self.gate.allows(access) {
            RouteDecision::Render
        } else {
            debug!(
                role = access.role(),
                required = ?self.gate.required_permissions,
                fallback = %self.fallback_path,
                "Route gate redirecting"
            );
            RouteDecision::Redirect(self.fallback_path.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::User;

    fn access(role: &str) -> Access {
        Access::for_user(Some(User::new("u1", role)))
    }

    #[test]
    fn test_empty_gate_always_renders() {
        let gate = PermissionGate::open();
        assert_eq!(gate.render(&Access::for_user(None), || "child", None), Some("child"));
        assert_eq!(gate.render(&access("employee"), || "child", None), Some("child"));
        assert!(PermissionGate::all_of(Vec::<String>::new()).allows(&Access::for_user(None)));
    }

    #[test]
    fn test_gate_renders_fallback_on_denial() {
        let gate = PermissionGate::any_of(["invoices.approve"]);
        assert_eq!(gate.render(&access("employee"), || "child", Some("nope")), Some("nope"));
        assert_eq!(gate.render(&access("employee"), || "child", None), None);
        assert_eq!(gate.render(&access("manager"), || "child", None), Some("child"));
    }

    #[test]
    fn test_any_versus_all() {
        let keys = ["invoices.approve", "admin.view"];
        assert!(PermissionGate::any_of(keys).allows(&access("manager")));
        assert!(!PermissionGate::all_of(keys).allows(&access("manager")));
        assert!(PermissionGate::all_of(keys).allows(&access("admin")));
    }

    #[test]
    fn test_route_gate_redirects_employee_from_admin() {
        let route = RouteGate::new(PermissionGate::all_of(["admin.view"]));
        assert_eq!(
            route.decide(&access("employee")),
            RouteDecision::Redirect("/dashboard".to_string())
        );
        assert_eq!(route.decide(&access("super_admin")), RouteDecision::Render);
    }

    #[test]
    fn test_route_gate_custom_fallback() {
        let route = RouteGate::new(PermissionGate::any_of(["users.view"])).with_fallback("/projects");
        assert_eq!(
            route.decide(&Access::for_user(None)),
            RouteDecision::Redirect("/projects".to_string())
        );
    }

    #[test]
    fn test_gate_deserializes_from_component_props() {
        let gate: PermissionGate =
            serde_json::from_str(r#"{"requiredPermissions":["admin.view"],"requireAll":true}"#).unwrap();
        assert_eq!(gate, PermissionGate::all_of(["admin.view"]));

        let gate: PermissionGate = serde_json::from_str("{}").unwrap();
        assert_eq!(gate, PermissionGate::open());
    }
}
