// SPDX-License-Identifier: PMPL-1.0-or-later
//! Subcommand implementations. Each returns data; `main` handles printing.

use clearance_core::{
    PermissionEvaluator, PermissionRegistry, Role, RoleTable, UnknownPermissionPolicy, User,
};
use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use serde_json::{json, Value};
use tracing::warn;

/// Catalog entries, optionally limited to one namespace.
pub fn permissions(namespace: Option<&str>) -> Value {
    let registry = PermissionRegistry::standard();
    let rows: Vec<Value> = registry
        .entries()
        .iter()
        .filter(|entry| namespace.map_or(true, |ns| entry.namespace() == ns))
        .map(|entry| json!({ "key": entry.key, "description": entry.description }))
        .collect();
    Value::Array(rows)
}

/// One role in detail, or a summary of every role.
pub fn roles(role: Option<Role>) -> Value {
    let table = RoleTable::standard();
    match role {
        Some(role) => json!({
            "role": role.as_str(),
            "rank": role.rank(),
            "full_access": role.has_full_access(),
            "permissions": table.permissions_for(role).iter().collect::<Vec<_>>(),
        }),
        None => Value::Array(
            Role::ALL
                .iter()
                .map(|&role| {
                    json!({
                        "role": role.as_str(),
                        "rank": role.rank(),
                        "full_access": role.has_full_access(),
                        "permissions": table.permissions_for(role).len(),
                    })
                })
                .collect(),
        ),
    }
}

/// Key-by-role grant matrix as JSON: `{ key: [roles holding it] }`.
pub fn matrix_json() -> Value {
    let registry = PermissionRegistry::standard();
    let table = RoleTable::standard();
    let map = registry
        .all_permission_keys()
        .into_iter()
        .map(|key| {
            let holders: Vec<&str> = Role::ALL
                .iter()
                .filter(|&&role| table.grants(role, key))
                .map(|role| role.as_str())
                .collect();
            (key.to_string(), json!(holders))
        })
        .collect();
    Value::Object(map)
}

/// Key-by-role grant matrix as a table.
pub fn matrix_table() -> String {
    let registry = PermissionRegistry::standard();
    let roles = RoleTable::standard();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec![Cell::new("permission")];
    header.extend(Role::ALL.iter().map(|role| Cell::new(role.as_str())));
    table.set_header(header);

    for key in registry.all_permission_keys() {
        let mut row = vec![Cell::new(key)];
        row.extend(Role::ALL.iter().map(|&role| {
            if roles.grants(role, key) {
                Cell::new("yes").fg(Color::Green).set_alignment(CellAlignment::Center)
            } else {
                Cell::new("-").set_alignment(CellAlignment::Center)
            }
        }));
        table.add_row(row);
    }

    table.to_string()
}

/// Inputs to `check`.
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub role: String,
    pub can_set_job_complete: bool,
    pub require_all: bool,
    pub policy: UnknownPermissionPolicy,
    pub keys: Vec<String>,
}

/// Result of `check`, one line per key plus the combined verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub granted: bool,
    pub per_key: Vec<(String, bool, bool)>,
}

pub fn check(request: &CheckRequest) -> CheckReport {
    // The flag is operator input: `Manager` means `manager`. Anything else is
    // evaluated as the raw role string a user record would carry.
    let role = match request.role.parse::<Role>() {
        Ok(role) => role.as_str().to_string(),
        Err(_) => {
            warn!(role = %request.role, "Role is not recognised; it holds no catalogued permissions");
            request.role.clone()
        }
    };

    let evaluator = PermissionEvaluator::new(request.policy);
    let user = User::new("cli", role).with_job_complete(request.can_set_job_complete);

    let granted = if request.require_all {
        evaluator.has_all_permissions(Some(&user), &request.keys)
    } else {
        evaluator.has_any_permission(Some(&user), &request.keys)
    };

    let per_key = request
        .keys
        .iter()
        .map(|key| {
            (
                key.clone(),
                evaluator.registry().is_known_permission(key),
                evaluator.has_permission(Some(&user), key),
            )
        })
        .collect();

    CheckReport { granted, per_key }
}

impl CheckReport {
    /// Coloured, human-readable rendering.
    pub fn render(&self, request: &CheckRequest) -> String {
        let mut lines = Vec::with_capacity(self.per_key.len() + 1);
        for (key, known, held) in &self.per_key {
            let mark = if *held { "granted".green() } else { "denied".red() };
            let note = if *known { String::new() } else { " (not in catalog)".yellow().to_string() };
            lines.push(format!("  {key:<32} {mark}{note}"));
        }
        let mode = if request.require_all { "all of" } else { "any of" };
        let verdict = if self.granted { "GRANTED".green().bold() } else { "DENIED".red().bold() };
        lines.push(format!("{} ({} {} keys): {}", request.role, mode, self.per_key.len(), verdict));
        lines.join("\n")
    }

    pub fn to_json(&self) -> Value {
        json!({
            "granted": self.granted,
            "keys": self.per_key.iter().map(|(key, known, held)| json!({
                "key": key,
                "known": known,
                "granted": held,
            })).collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(role: &str, keys: &[&str]) -> CheckRequest {
        CheckRequest {
            role: role.to_string(),
            can_set_job_complete: false,
            require_all: false,
            policy: UnknownPermissionPolicy::Allow,
            keys: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn test_permissions_filter_by_namespace() {
        let all = permissions(None);
        let invoices = permissions(Some("invoices"));
        let invoices = invoices.as_array().unwrap();

        assert!(invoices.len() < all.as_array().unwrap().len());
        assert!(invoices
            .iter()
            .all(|e| e["key"].as_str().unwrap().starts_with("invoices.")));
    }

    #[test]
    fn test_roles_summary_and_detail() {
        let summary = roles(None);
        assert_eq!(summary.as_array().unwrap().len(), 4);

        let manager = roles(Some(Role::Manager));
        assert_eq!(manager["role"], "manager");
        let keys = manager["permissions"].as_array().unwrap();
        assert!(keys.contains(&json!("invoices.approve")));
    }

    #[test]
    fn test_matrix_lists_holders() {
        let matrix = matrix_json();
        assert_eq!(matrix["admin.view"], json!(["admin", "super_admin"]));
        assert_eq!(
            matrix["timesheets.view"],
            json!(["employee", "manager", "admin", "super_admin"])
        );
    }

    #[test]
    fn test_matrix_table_has_every_role() {
        let out = matrix_table();
        for role in Role::ALL {
            assert!(out.contains(role.as_str()));
        }
    }

    #[test]
    fn test_check_any_of() {
        let report = check(&request("employee", &["timesheets.view", "projects.delete"]));
        assert!(report.granted);
        assert_eq!(report.per_key[1], ("projects.delete".to_string(), true, false));
    }

    #[test]
    fn test_check_role_flag_is_normalised() {
        assert!(check(&request(" Manager ", &["invoices.approve"])).granted);
        assert!(!check(&request("contractor", &["invoices.approve"])).granted);
    }

    #[test]
    fn test_check_all_of() {
        let mut req = request("employee", &["timesheets.view", "projects.delete"]);
        req.require_all = true;
        assert!(!check(&req).granted);
    }

    #[test]
    fn test_check_unknown_key_follows_policy() {
        let mut req = request("employee", &["made.up"]);
        assert!(check(&req).granted);
        req.policy = UnknownPermissionPolicy::Deny;
        assert!(!check(&req).granted);
    }

    #[test]
    fn test_check_job_complete_override() {
        let mut req = request("employee", &["projects.set_job_complete"]);
        assert!(!check(&req).granted);
        req.can_set_job_complete = true;
        assert!(check(&req).granted);
    }

    #[test]
    fn test_report_json_shape() {
        let report = check(&request("manager", &["invoices.approve"]));
        let value = report.to_json();
        assert_eq!(value["granted"], true);
        assert_eq!(value["keys"][0]["known"], true);
    }
}
