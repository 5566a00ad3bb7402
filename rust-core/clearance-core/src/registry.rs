// SPDX-License-Identifier: PMPL-1.0-or-later
//! Permission registry.
//!
//! Holds the canonical list of permission keys and their descriptions. Only
//! keys present here are enforced; the evaluator treats anything else
//! according to its [`UnknownPermissionPolicy`](crate::UnknownPermissionPolicy).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::catalog::CATALOG;

/// A catalogued permission key and its description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionInfo {
    /// Dot-namespaced key, e.g. `clients.write_off`.
    pub key: String,
    /// Human-readable description shown in role editors.
    pub description: String,
}

impl PermissionInfo {
    /// The namespace (text before the first `.`), or the whole key when it
    /// has no dot.
    pub fn namespace(&self) -> &str {
        self.key.split('.').next().unwrap_or(&self.key)
    }
}

/// Immutable catalog of permission keys.
#[derive(Debug, Clone)]
pub struct PermissionRegistry {
    entries: Vec<PermissionInfo>,
    /// Key -> position in `entries`.
    index: HashMap<String, usize>,
}

impl PermissionRegistry {
    /// Build a registry from `(key, description)` pairs.
    ///
    /// Catalog order is preserved. A repeated key keeps its first position
    /// and description.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut entries = Vec::new();
        let mut index = HashMap::new();
        for (key, description) in pairs {
            if index.contains_key(key) {
                continue;
            }
            index.insert(key.to_string(), entries.len());
            entries.push(PermissionInfo {
                key: key.to_string(),
                description: description.to_string(),
            });
        }
        Self { entries, index }
    }

    /// The built-in catalog, constructed once per process.
    pub fn standard() -> Arc<PermissionRegistry> {
        static STANDARD: OnceLock<Arc<PermissionRegistry>> = OnceLock::new();
        STANDARD
            .get_or_init(|| Arc::new(PermissionRegistry::from_pairs(CATALOG.iter().copied())))
            .clone()
    }

    /// Every catalogued key in catalog order.
    pub fn all_permission_keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    /// Whether `key` is catalogued (and therefore enforced).
    pub fn is_known_permission(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Description for a catalogued key.
    pub fn description(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&i| self.entries[i].description.as_str())
    }

    /// All entries in catalog order.
    pub fn entries(&self) -> &[PermissionInfo] {
        &self.entries
    }

    /// Distinct namespaces in first-seen order.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            let ns = entry.namespace();
            if !seen.contains(&ns) {
                seen.push(ns);
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_matches_catalog() {
        let registry = PermissionRegistry::standard();
        assert_eq!(registry.len(), CATALOG.len());
        assert_eq!(registry.all_permission_keys()[0], CATALOG[0].0);
        assert!(registry.is_known_permission("clients.write_off"));
        assert!(registry.is_known_permission("invoices.approve"));
        assert!(!registry.is_known_permission("not.a.real.key"));
        assert!(!registry.is_known_permission(""));
    }

    #[test]
    fn test_standard_registry_is_shared() {
        let a = PermissionRegistry::standard();
        let b = PermissionRegistry::standard();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_catalog_has_no_duplicate_keys() {
        let registry = PermissionRegistry::standard();
        let mut keys = registry.all_permission_keys();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), CATALOG.len());
    }

    #[test]
    fn test_duplicate_pairs_keep_first_description() {
        let registry = PermissionRegistry::from_pairs([
            ("a.read", "first"),
            ("b.read", "other"),
            ("a.read", "second"),
        ]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.all_permission_keys(), vec!["a.read", "b.read"]);
        assert_eq!(registry.description("a.read"), Some("first"));
    }

    #[test]
    fn test_description_lookup() {
        let registry = PermissionRegistry::standard();
        assert_eq!(
            registry.description("invoices.approve"),
            Some("Approve invoices for sending")
        );
        assert_eq!(registry.description("invoices.fly"), None);
    }

    #[test]
    fn test_namespaces_in_first_seen_order() {
        let registry = PermissionRegistry::from_pairs([
            ("projects.view", ""),
            ("clients.view", ""),
            ("projects.edit", ""),
            ("standalone", ""),
        ]);
        assert_eq!(
            registry.namespaces(),
            vec!["projects", "clients", "standalone"]
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = PermissionRegistry::from_pairs(std::iter::empty());
        assert!(registry.is_empty());
        assert!(registry.all_permission_keys().is_empty());
    }
}
