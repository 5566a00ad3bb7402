// SPDX-License-Identifier: PMPL-1.0-or-later
//! Permission evaluation.
//!
//! Answers "can this user do X". Evaluation is pure: no I/O, no hidden state,
//! and every input (absent user, empty key list, unknown key) produces a
//! boolean.
//!
//! Rules, in order:
//!
//! 1. No user, or a user without a role: denied.
//! 2. A key missing from the registry is resolved by the
//!    [`UnknownPermissionPolicy`]. Under `Allow`, a single unknown key in a
//!    list grants the whole `any`/`all` check.
//! 3. Otherwise the key must be in the role's permission set or granted by a
//!    per-user override. Unrecognised roles hold no keys.

use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

use crate::catalog::SET_JOB_COMPLETE;
use crate::policy::UnknownPermissionPolicy;
use crate::registry::PermissionRegistry;
use crate::tiers::RoleTable;
use crate::user::User;

/// Evaluates permission checks against a registry and role table.
#[derive(Debug, Clone)]
pub struct PermissionEvaluator {
    registry: Arc<PermissionRegistry>,
    roles: Arc<RoleTable>,
    policy: UnknownPermissionPolicy,
}

impl PermissionEvaluator {
    /// Evaluator over the built-in catalog with the given policy.
    pub fn new(policy: UnknownPermissionPolicy) -> Self {
        Self::with_tables(PermissionRegistry::standard(), RoleTable::standard(), policy)
    }

    /// Evaluator over custom tables.
    pub fn with_tables(
        registry: Arc<PermissionRegistry>,
        roles: Arc<RoleTable>,
        policy: UnknownPermissionPolicy,
    ) -> Self {
        Self {
            registry,
            roles,
            policy,
        }
    }

    /// Shared evaluator over the built-in catalog with the `Allow` policy.
    pub fn standard() -> &'static PermissionEvaluator {
        static STANDARD: OnceLock<PermissionEvaluator> = OnceLock::new();
        STANDARD.get_or_init(|| PermissionEvaluator::new(UnknownPermissionPolicy::Allow))
    }

    pub fn registry(&self) -> &PermissionRegistry {
        &self.registry
    }

    pub fn roles(&self) -> &RoleTable {
        &self.roles
    }

    pub fn policy(&self) -> UnknownPermissionPolicy {
        self.policy
    }

    /// Whether `user` holds `key`.
    pub fn has_permission(&self, user: Option<&User>, key: &str) -> bool {
        let Some(user) = user.filter(|u| u.role_str().is_some()) else {
            return false;
        };
        if !self.registry.is_known_permission(key) {
            return self.resolve_unknown(key);
        }
        self.holds(user, key)
    }

    /// Whether `user` holds at least one of `keys`.
    pub fn has_any_permission<K: AsRef<str>>(&self, user: Option<&User>, keys: &[K]) -> bool {
        let Some(user) = user.filter(|u| u.role_str().is_some()) else {
            return false;
        };
        match self.policy {
            UnknownPermissionPolicy::Allow => {
                if let Some(key) = self.first_unknown(keys) {
                    debug!(key = %key, "Unrestricted key grants any-of check");
                    return true;
                }
                keys.iter().any(|k| self.holds(user, k.as_ref()))
            }
            UnknownPermissionPolicy::Deny => {
                if let Some(key) = self.first_unknown(keys) {
                    warn!(key = %key, "Ignoring uncatalogued permission key");
                }
                keys.iter().any(|k| {
                    let k = k.as_ref();
                    self.registry.is_known_permission(k) && self.holds(user, k)
                })
            }
        }
    }

    /// Whether `user` holds every one of `keys`.
    ///
    /// An empty list is vacuously satisfied for a user with a role.
    pub fn has_all_permissions<K: AsRef<str>>(&self, user: Option<&User>, keys: &[K]) -> bool {
        let Some(user) = user.filter(|u| u.role_str().is_some()) else {
            return false;
        };
        if let Some(key) = self.first_unknown(keys) {
            return self.resolve_unknown(key);
        }
        keys.iter().all(|k| self.holds(user, k.as_ref()))
    }

    /// Every catalogued key `user` holds, in catalog order.
    pub fn granted_permissions(&self, user: Option<&User>) -> Vec<&str> {
        let Some(user) = user.filter(|u| u.role_str().is_some()) else {
            return Vec::new();
        };
        self.registry
            .all_permission_keys()
            .into_iter()
            .filter(|k| self.holds(user, k))
            .collect()
    }

    /// Role set membership plus per-user overrides, for a catalogued key.
    fn holds(&self, user: &User, key: &str) -> bool {
        if let Some(role) = user.parsed_role() {
            if self.roles.grants(role, key) {
                return true;
            }
        }
        user.can_set_job_complete && key == SET_JOB_COMPLETE
    }

    fn first_unknown<'k, K: AsRef<str>>(&self, keys: &'k [K]) -> Option<&'k str> {
        keys.iter()
            .map(AsRef::as_ref)
            .find(|k| !self.registry.is_known_permission(k))
    }

    fn resolve_unknown(&self, key: &str) -> bool {
        match self.policy {
            UnknownPermissionPolicy::Allow => {
                debug!(key = %key, "Uncatalogued permission key is unrestricted");
                true
            }
            UnknownPermissionPolicy::Deny => {
                warn!(key = %key, "Denying uncatalogued permission key");
                false
            }
        }
    }
}

impl Default for PermissionEvaluator {
    fn default() -> Self {
        Self::new(UnknownPermissionPolicy::default())
    }
}

/// [`PermissionEvaluator::has_permission`] on the standard evaluator.
pub fn has_permission(user: Option<&User>, key: &str) -> bool {
    PermissionEvaluator::standard().has_permission(user, key)
}

/// [`PermissionEvaluator::has_any_permission`] on the standard evaluator.
pub fn has_any_permission<K: AsRef<str>>(user: Option<&User>, keys: &[K]) -> bool {
    PermissionEvaluator::standard().has_any_permission(user, keys)
}

/// [`PermissionEvaluator::has_all_permissions`] on the standard evaluator.
pub fn has_all_permissions<K: AsRef<str>>(user: Option<&User>, keys: &[K]) -> bool {
    PermissionEvaluator::standard().has_all_permissions(user, keys)
}
