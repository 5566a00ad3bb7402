// SPDX-License-Identifier: PMPL-1.0-or-later
//! Access view over the current user.
//!
//! [`Access`] binds the evaluator to whoever is currently authenticated and
//! exposes the booleans UI and route code actually consume. [`AccessCache`]
//! keeps one `Access` alive until the current user changes, so repeated
//! lookups for the same user share a single instance.

use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::evaluator::PermissionEvaluator;
use crate::role::Role;
use crate::user::User;

/// Role shown when there is no user or the user has no role.
pub const DEFAULT_DISPLAY_ROLE: &str = "employee";

/// Permission checks bound to one (possibly absent) user.
#[derive(Debug, Clone)]
pub struct Access {
    user: Option<User>,
    evaluator: PermissionEvaluator,
}

impl Access {
    pub fn new(user: Option<User>, evaluator: PermissionEvaluator) -> Self {
        Self { user, evaluator }
    }

    /// Access on the standard evaluator.
    pub fn for_user(user: Option<User>) -> Self {
        Self::new(user, PermissionEvaluator::standard().clone())
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn can(&self, key: &str) -> bool {
        self.evaluator.has_permission(self.user.as_ref(), key)
    }

    pub fn can_any<K: AsRef<str>>(&self, keys: &[K]) -> bool {
        self.evaluator.has_any_permission(self.user.as_ref(), keys)
    }

    pub fn can_all<K: AsRef<str>>(&self, keys: &[K]) -> bool {
        self.evaluator.has_all_permissions(self.user.as_ref(), keys)
    }

    /// Display role: the user's role string, or `employee` when absent.
    pub fn role(&self) -> &str {
        self.user
            .as_ref()
            .and_then(User::role_str)
            .unwrap_or(DEFAULT_DISPLAY_ROLE)
    }

    /// Strictly `admin`; a `super_admin` is not an admin here.
    pub fn is_admin(&self) -> bool {
        self.role_is(Role::Admin)
    }

    pub fn is_super_admin(&self) -> bool {
        self.role_is(Role::SuperAdmin)
    }

    pub fn is_manager(&self) -> bool {
        self.role_is(Role::Manager)
    }

    /// Strictly `employee`; false when there is no user.
    pub fn is_employee(&self) -> bool {
        self.role_is(Role::Employee)
    }

    /// Catalogued keys held by the user, in catalog order.
    pub fn granted(&self) -> Vec<&str> {
        self.evaluator.granted_permissions(self.user.as_ref())
    }

    fn role_is(&self, role: Role) -> bool {
        self.user.as_ref().and_then(User::role_str) == Some(role.as_str())
    }
}

#[derive(Debug, Default)]
struct CacheSlot {
    current: Option<Arc<Access>>,
    recomputations: u64,
}

/// Single-slot memo of [`Access`] keyed on the user value.
#[derive(Debug)]
pub struct AccessCache {
    evaluator: PermissionEvaluator,
    slot: Mutex<CacheSlot>,
}

impl AccessCache {
    pub fn new(evaluator: PermissionEvaluator) -> Self {
        Self {
            evaluator,
            slot: Mutex::new(CacheSlot::default()),
        }
    }

    /// Access for `user`, rebuilt only if `user` differs from the cached one.
    pub fn resolve(&self, user: Option<&User>) -> Arc<Access> {
        let mut slot = self.slot.lock().expect("access cache lock");
        if let Some(current) = &slot.current {
            if current.user() == user {
                return Arc::clone(current);
            }
        }

        let access = Arc::new(Access::new(user.cloned(), self.evaluator.clone()));
        slot.current = Some(Arc::clone(&access));
        slot.recomputations += 1;
        debug!(
            user = user.map(|u| u.id.as_str()).unwrap_or("<none>"),
            role = access.role(),
            "Recomputed access"
        );
        access
    }

    /// Number of times an `Access` was built.
    pub fn recomputations(&self) -> u64 {
        self.slot.lock().expect("access cache lock").recomputations
    }

    /// Drop the cached value so the next `resolve` rebuilds.
    pub fn invalidate(&self) {
        self.slot.lock().expect("access cache lock").current = None;
    }
}

impl Default for AccessCache {
    fn default() -> Self {
        Self::new(PermissionEvaluator::standard().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_defaults_to_employee_display() {
        let access = Access::for_user(None);
        assert_eq!(access.role(), "employee");
        assert!(!access.is_employee());
        assert!(!access.can("projects.view"));

        let access = Access::for_user(Some(User::without_role("u1")));
        assert_eq!(access.role(), "employee");
    }

    #[test]
    fn test_role_flags_are_strict() {
        let super_admin = Access::for_user(Some(User::new("u1", "super_admin")));
        assert!(!super_admin.is_admin());
        assert!(super_admin.is_super_admin());
        assert!(!super_admin.is_manager());

        let admin = Access::for_user(Some(User::new("u2", "admin")));
        assert!(admin.is_admin());
        assert!(!admin.is_super_admin());

        let manager = Access::for_user(Some(User::new("u3", "manager")));
        assert!(manager.is_manager());
        assert!(!manager.is_employee());

        // Case differences do not satisfy strict equality.
        let shouting = Access::for_user(Some(User::new("u4", "ADMIN")));
        assert!(!shouting.is_admin());
        assert_eq!(shouting.role(), "ADMIN");
    }

    #[test]
    fn test_flags_and_checks_agree_on_non_canonical_roles() {
        let shouting = Access::for_user(Some(User::new("u4", "ADMIN")));
        assert!(!shouting.is_admin());
        assert!(!shouting.can("users.manage_roles"));
        assert!(shouting.granted().is_empty());

        let padded = Access::for_user(Some(User::new("u5", " Manager ")));
        assert!(!padded.is_manager());
        assert!(!padded.can("invoices.approve"));
        assert!(padded.can("not.a.real.key"));
    }

    #[test]
    fn test_access_delegates_to_evaluator() {
        let manager = Access::for_user(Some(User::new("u1", "manager")));
        assert!(manager.can("invoices.approve"));
        assert!(manager.can_any(&["admin.view", "invoices.approve"]));
        assert!(!manager.can_all(&["admin.view", "invoices.approve"]));
        assert!(manager.granted().contains(&"invoices.approve"));
    }

    #[test]
    fn test_cache_reuses_access_for_same_user() {
        let cache = AccessCache::default();
        let user = User::new("u1", "manager");

        let first = cache.resolve(Some(&user));
        let second = cache.resolve(Some(&user.clone()));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.recomputations(), 1);
    }

    #[test]
    fn test_cache_recomputes_when_user_changes() {
        let cache = AccessCache::default();
        let employee = User::new("u1", "employee");
        let promoted = User::new("u1", "manager");

        assert!(!cache.resolve(Some(&employee)).can("invoices.approve"));
        assert!(cache.resolve(Some(&promoted)).can("invoices.approve"));
        assert_eq!(cache.recomputations(), 2);

        // Logging out is a change too.
        assert!(!cache.resolve(None).can("invoices.approve"));
        assert!(!cache.resolve(None).can("invoices.approve"));
        assert_eq!(cache.recomputations(), 3);
    }

    #[test]
    fn test_cache_invalidate() {
        let cache = AccessCache::default();
        let user = User::new("u1", "admin");
        let first = cache.resolve(Some(&user));
        cache.invalidate();
        let second = cache.resolve(Some(&user));
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(cache.recomputations(), 2);
    }
}
