// SPDX-License-Identifier: PMPL-1.0-or-later
//! End-to-end scenarios across the registry, evaluator, access view and gates.

use clearance_core::{
    Access, AccessCache, LeaveDecision, LeaveOutcome, NavigationGuard, PermissionGate,
    PermissionRegistry, RouteDecision, RouteGate, User,
};

// ===========================================================================
// Evaluator scenarios
// ===========================================================================

#[test]
fn test_invoice_approval_across_roles() {
    let manager = Access::for_user(Some(User::new("m", "manager")));
    let employee = Access::for_user(Some(User::new("e", "employee")));
    let super_admin = Access::for_user(Some(User::new("s", "super_admin")));

    assert!(manager.can("invoices.approve"));
    assert!(!employee.can("invoices.approve"));
    assert!(super_admin.can("invoices.approve"));
}

#[test]
fn test_unknown_key_leniency_needs_a_user() {
    assert!(!Access::for_user(None).can("not.a.real.key"));
    assert!(Access::for_user(Some(User::new("e", "employee"))).can("not.a.real.key"));
}

#[test]
fn test_employee_any_of_timesheets_or_delete() {
    let employee = Access::for_user(Some(User::new("e", "employee")));
    assert!(employee.can_any(&["timesheets.view", "projects.delete"]));
}

#[test]
fn test_every_catalogued_key_has_a_description() {
    let registry = PermissionRegistry::standard();
    for entry in registry.entries() {
        assert!(!entry.description.is_empty(), "{} has no description", entry.key);
        assert!(entry.key.contains('.'), "{} is not namespaced", entry.key);
    }
}

// ===========================================================================
// Gate scenarios
// ===========================================================================

#[test]
fn test_open_gate_renders_for_anyone() {
    let gate = PermissionGate::open();
    for user in [None, Some(User::without_role("x")), Some(User::new("e", "employee"))] {
        let access = Access::for_user(user);
        assert_eq!(gate.render(&access, || "children", None), Some("children"));
    }
}

#[test]
fn test_admin_route_redirects_employee_to_dashboard() {
    let route = RouteGate::new(PermissionGate::all_of(["admin.view"]));
    let employee = Access::for_user(Some(User::new("e", "employee")));
    assert_eq!(
        route.decide(&employee),
        RouteDecision::Redirect("/dashboard".to_string())
    );
}

#[test]
fn test_admin_check_excludes_super_admin() {
    // Screens gated on "admin or manager" do not let a super admin through
    // unless they also check super admin explicitly.
    let super_admin = Access::for_user(Some(User::new("s", "super_admin")));
    assert!(!(super_admin.is_admin() || super_admin.is_manager()));
    assert!(super_admin.is_super_admin());
}

// ===========================================================================
// Access cache
// ===========================================================================

#[test]
fn test_cache_follows_login_and_logout() {
    let cache = AccessCache::default();
    let alice = User::new("alice", "manager");

    for _ in 0..5 {
        assert!(cache.resolve(Some(&alice)).can("invoices.approve"));
    }
    assert_eq!(cache.recomputations(), 1);

    assert!(!cache.resolve(None).can("invoices.approve"));
    assert_eq!(cache.recomputations(), 2);
}

// ===========================================================================
// Navigation guard
// ===========================================================================

#[test]
fn test_edit_then_navigate_away_flow() {
    let mut guard = NavigationGuard::new();

    // No edits: navigation goes straight through.
    assert!(matches!(
        guard.request_leave("/projects/42").unwrap(),
        LeaveDecision::Proceed { .. }
    ));

    // Edit, try to leave, change mind, then leave for real.
    guard.mark_dirty().unwrap();
    assert!(matches!(
        guard.request_leave("/clients").unwrap(),
        LeaveDecision::NeedsConfirmation { .. }
    ));
    assert_eq!(guard.cancel_leave().unwrap(), LeaveOutcome::Cancelled);
    assert!(guard.has_unsaved_changes());

    guard.request_leave("/clients").unwrap();
    assert_eq!(
        guard.confirm_leave().unwrap(),
        LeaveOutcome::Discarded { target: "/clients".to_string() }
    );
    assert!(!guard.has_unsaved_changes());
}
