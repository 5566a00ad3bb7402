// SPDX-License-Identifier: PMPL-1.0-or-later
//! Per-user unsaved-changes guards.

use clearance_core::{NavigationGuard, PermissionResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Shared map from user id to that user's [`NavigationGuard`].
#[derive(Debug, Clone, Default)]
pub struct NavigationStore {
    guards: Arc<Mutex<HashMap<String, NavigationGuard>>>,
}

impl NavigationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the user's guard (clean if never touched).
    pub fn get(&self, user_id: &str) -> NavigationGuard {
        let guards = self.guards.lock().expect("navigation store lock");
        guards.get(user_id).cloned().unwrap_or_default()
    }

    /// Apply a transition to the user's guard.
    ///
    /// A failed transition leaves the stored guard as it was.
    pub fn apply<T>(
        &self,
        user_id: &str,
        transition: impl FnOnce(&mut NavigationGuard) -> PermissionResult<T>,
    ) -> PermissionResult<(T, NavigationGuard)> {
        let mut guards = self.guards.lock().expect("navigation store lock");
        let guard = guards.entry(user_id.to_string()).or_default();
        let outcome = transition(guard)?;
        Ok((outcome, guard.clone()))
    }

    /// Forget the user's guard, e.g. on logout.
    pub fn clear(&self, user_id: &str) -> bool {
        self.guards
            .lock()
            .expect("navigation store lock")
            .remove(user_id)
            .is_some()
    }
}
