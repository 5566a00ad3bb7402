// SPDX-License-Identifier: PMPL-1.0-or-later
//! Role permission sets.
//!
//! Roles grant cumulative capability tiers: each role holds the keys of its
//! own tier plus every tier below it. Roles with full access (`admin`,
//! `super_admin`) are granted the whole registry, so they need no maintenance
//! when keys are added.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, OnceLock};

use crate::catalog::{EMPLOYEE_TIER, MANAGER_TIER};
use crate::error::{PermissionError, PermissionResult};
use crate::registry::PermissionRegistry;
use crate::role::Role;

/// Keys introduced at one role's tier.
#[derive(Debug, Clone, Copy)]
pub struct RoleTier<'a> {
    pub role: Role,
    pub keys: &'a [&'a str],
}

/// Resolved permission set per role.
#[derive(Debug, Clone)]
pub struct RoleTable {
    sets: HashMap<Role, BTreeSet<String>>,
}

impl RoleTable {
    /// Resolve each role's permission set from tiers.
    ///
    /// Tiers attached to full-access roles are ignored; those roles always
    /// receive the whole registry.
    ///
    /// # Errors
    /// [`PermissionError::UncataloguedTierKey`] when a tier lists a key the
    /// registry does not know.
    pub fn from_tiers(registry: &PermissionRegistry, tiers: &[RoleTier<'_>]) -> PermissionResult<Self> {
        for tier in tiers {
            if let Some(key) = tier.keys.iter().find(|k| !registry.is_known_permission(k)) {
                return Err(PermissionError::UncataloguedTierKey {
                    role: tier.role.to_string(),
                    key: (*key).to_string(),
                });
            }
        }

        let everything: BTreeSet<String> = registry
            .all_permission_keys()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut sets = HashMap::with_capacity(Role::ALL.len());
        for role in Role::ALL {
            let set = if role.has_full_access() {
                everything.clone()
            } else {
                tiers
                    .iter()
                    .filter(|tier| role.includes(tier.role))
                    .flat_map(|tier| tier.keys.iter().map(|k| (*k).to_string()))
                    .collect()
            };
            sets.insert(role, set);
        }

        Ok(Self { sets })
    }

    /// The built-in table over [`PermissionRegistry::standard`].
    pub fn standard() -> Arc<RoleTable> {
        static STANDARD: OnceLock<Arc<RoleTable>> = OnceLock::new();
        STANDARD
            .get_or_init(|| {
                let registry = PermissionRegistry::standard();
                let tiers = [
                    RoleTier { role: Role::Employee, keys: EMPLOYEE_TIER },
                    RoleTier { role: Role::Manager, keys: MANAGER_TIER },
                ];
                // Covered by `test_builtin_tiers_are_catalogued`.
                let table = RoleTable::from_tiers(&registry, &tiers)
                    .expect("built-in role tiers reference catalogued keys");
                Arc::new(table)
            })
            .clone()
    }

    /// Permission set for `role`.
    pub fn permissions_for(&self, role: Role) -> &BTreeSet<String> {
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        self.sets.get(&role).unwrap_or(&EMPTY)
    }

    /// Whether `role` holds `key`.
    pub fn grants(&self, role: Role, key: &str) -> bool {
        self.permissions_for(role).contains(key)
    }
}
