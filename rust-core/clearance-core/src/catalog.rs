// SPDX-License-Identifier: PMPL-1.0-or-later
//! Built-in permission catalog and role tiers.
//!
//! This is the single place to add or remove permission keys. `admin` and
//! `super_admin` are granted the whole catalog automatically, so a new key
//! only needs to be listed in a tier if managers or employees should hold it.

// ---------------------------------------------------------------------------
// Permission catalog
// ---------------------------------------------------------------------------

/// Every enforced permission key with its human-readable description, in
/// display order.
pub const CATALOG: &[(&str, &str)] = &[
    // Projects
    ("projects.view", "View projects and job details"),
    ("projects.create", "Create new projects"),
    ("projects.edit", "Edit project details"),
    ("projects.delete", "Delete projects"),
    ("projects.change_status", "Change project status"),
    ("projects.set_job_complete", "Mark a project job as complete"),
    // Clients
    ("clients.view", "View clients"),
    ("clients.create", "Create clients"),
    ("clients.edit", "Edit client details"),
    ("clients.delete", "Delete clients"),
    ("clients.write_off", "Write off outstanding client balances"),
    // Invoices
    ("invoices.view", "View invoices"),
    ("invoices.create", "Create invoices"),
    ("invoices.edit", "Edit draft invoices"),
    ("invoices.delete", "Delete invoices"),
    ("invoices.approve", "Approve invoices for sending"),
    ("invoices.sync_xero", "Sync invoices with Xero"),
    // Timesheets
    ("timesheets.view", "View own timesheets"),
    ("timesheets.create", "Create timesheet entries"),
    ("timesheets.edit", "Edit timesheet entries"),
    ("timesheets.review", "Review other users' timesheets"),
    ("timesheets.approve", "Approve timesheets"),
    // Users
    ("users.view", "View users"),
    ("users.create", "Create users"),
    ("users.edit", "Edit users"),
    ("users.delete", "Deactivate or delete users"),
    ("users.manage_roles", "Assign user roles"),
    // Lab calibrations
    ("calibrations.view", "View equipment calibrations"),
    ("calibrations.create", "Record equipment calibrations"),
    ("calibrations.edit", "Edit equipment calibrations"),
    ("calibrations.delete", "Delete equipment calibrations"),
    // Surveys
    ("surveys.view", "View surveys"),
    ("surveys.create", "Create surveys"),
    ("surveys.edit", "Edit surveys"),
    ("surveys.delete", "Delete surveys"),
    ("surveys.approve", "Approve completed surveys"),
    // Custom reference data
    ("custom_data.view", "View custom reference data"),
    ("custom_data.edit", "Edit custom reference data"),
    // Reports
    ("reports.view", "View reports"),
    ("reports.export", "Export reports"),
    // Administration
    ("admin.view", "Access the administration area"),
    ("admin.settings", "Change application settings"),
    ("xero.connect", "Connect or disconnect the Xero organisation"),
];

// ---------------------------------------------------------------------------
// Role tiers
// ---------------------------------------------------------------------------

/// Keys held by every employee.
pub const EMPLOYEE_TIER: &[&str] = &[
    "projects.view",
    "projects.create",
    "projects.edit",
    "clients.view",
    "clients.create",
    "clients.edit",
    "invoices.view",
    "timesheets.view",
    "timesheets.create",
    "timesheets.edit",
    "calibrations.view",
    "calibrations.create",
    "calibrations.edit",
    "surveys.view",
    "surveys.create",
    "surveys.edit",
    "custom_data.view",
    "reports.view",
];

/// Keys a manager holds on top of [`EMPLOYEE_TIER`].
pub const MANAGER_TIER: &[&str] = &[
    "projects.delete",
    "projects.change_status",
    "projects.set_job_complete",
    "clients.write_off",
    "invoices.create",
    "invoices.edit",
    "invoices.approve",
    "timesheets.review",
    "timesheets.approve",
    "users.view",
    "calibrations.delete",
    "surveys.delete",
    "surveys.approve",
    "custom_data.edit",
    "reports.export",
];

/// Key granted by the per-user `can_set_job_complete` flag.
pub const SET_JOB_COMPLETE: &str = "projects.set_job_complete";
