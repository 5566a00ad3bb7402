// SPDX-License-Identifier: PMPL-1.0-or-later
//! Clearance Core
//!
//! Role-based permission model for the consultancy operations app.
//!
//! # Architecture
//!
//! - **PermissionRegistry**: the fixed catalog of dot-namespaced permission
//!   keys (`projects.edit`, `clients.write_off`, ...) with descriptions.
//! - **RoleTable**: each role's permission set, resolved from cumulative
//!   tiers. `admin` and `super_admin` receive the whole catalog.
//! - **PermissionEvaluator**: `has_permission`, `has_any_permission`,
//!   `has_all_permissions`. Infallible and stateless.
//! - **Access / AccessCache**: the evaluator bound to the current user,
//!   recomputed only when that user changes.
//! - **PermissionGate / RouteGate**: declarative render and route guards.
//! - **NavigationGuard**: unsaved-changes state machine.
//!
//! Keys missing from the registry are granted under the default
//! [`UnknownPermissionPolicy::Allow`]. A mistyped key therefore disables
//! enforcement instead of locking users out; use
//! [`UnknownPermissionPolicy::Deny`] to fail closed.

pub mod access;
pub mod catalog;
pub mod error;
pub mod evaluator;
pub mod gate;
pub mod navigation;
pub mod policy;
pub mod registry;
pub mod role;
pub mod tiers;
pub mod user;

pub use access::{Access, AccessCache, DEFAULT_DISPLAY_ROLE};
pub use error::{PermissionError, PermissionResult};
pub use evaluator::{has_all_permissions, has_any_permission, has_permission, PermissionEvaluator};
pub use gate::{PermissionGate, RouteDecision, RouteGate, DEFAULT_FALLBACK_PATH};
pub use navigation::{LeaveDecision, LeaveOutcome, NavigationGuard, NavigationState};
pub use policy::{PolicyConfig, UnknownPermissionPolicy};
pub use registry::{PermissionInfo, PermissionRegistry};
pub use role::Role;
pub use tiers::{RoleTable, RoleTier};
pub use user::User;
