// SPDX-License-Identifier: PMPL-1.0-or-later
// Fuzz target for permission evaluation with arbitrary role and key strings

#![no_main]

use clearance_core::{
    Access, NavigationGuard, PermissionEvaluator, PermissionGate, Role, UnknownPermissionPolicy,
    User,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    // First line is the role, the rest are keys.
    let mut lines = s.lines();
    let role = lines.next().unwrap_or_default();
    let keys: Vec<&str> = lines.take(16).collect();

    let _ = role.parse::<Role>();
    let user = User::new("fuzz", role).with_job_complete(data.len() % 2 == 0);

    let lenient = PermissionEvaluator::new(UnknownPermissionPolicy::Allow);
    let strict = PermissionEvaluator::new(UnknownPermissionPolicy::Deny);

    for key in &keys {
        // Deny can only ever narrow what Allow grants.
        if strict.has_permission(Some(&user), key) {
            assert!(lenient.has_permission(Some(&user), key));
        }
        assert!(!lenient.has_permission(None, key));
    }

    // Only exact wire names resolve to a role set.
    if Role::from_wire(role).is_none() && !user.can_set_job_complete {
        assert!(lenient.granted_permissions(Some(&user)).is_empty());
    }

    let any = lenient.has_any_permission(Some(&user), &keys);
    let all = lenient.has_all_permissions(Some(&user), &keys);
    if !keys.is_empty() && all {
        assert!(any);
    }

    let access = Access::new(Some(user), lenient);
    let _ = access.role();
    let _ = PermissionGate::any_of(keys.iter().copied()).allows(&access);

    // Drive the navigation guard with the raw bytes as events.
    let mut guard = NavigationGuard::new();
    for byte in data.iter().take(64) {
        let _ = match byte % 5 {
            0 => guard.mark_dirty().map(|_| ()),
            1 => guard.mark_saved().map(|_| ()),
            2 => guard.request_leave(role).map(|_| ()),
            3 => guard.confirm_leave().map(|_| ()),
            _ => guard.cancel_leave().map(|_| ()),
        };
    }
});
