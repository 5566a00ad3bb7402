// SPDX-License-Identifier: PMPL-1.0-or-later
//! Permission enforcement for Clearance routes.
//!
//! Two middleware flavours sit on top of [`clearance_core::PermissionGate`]:
//!
//! - [`api_guard`] rejects a denied request with a 403 JSON body.
//! - [`page_guard`] redirects a denied request (303) to the configured
//!   fallback path, the server-side equivalent of a permission route.
//!
//! Every decision is recorded in the [`AuditLog`].

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::{DateTime, Utc};
use clearance_core::{
    Access, AccessCache, PermissionEvaluator, PermissionGate, RouteDecision, RouteGate, User,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::auth::CurrentUser;
use crate::AppState;

// ---------------------------------------------------------------------------
// Access decisions and audit
// ---------------------------------------------------------------------------

/// Outcome of a gated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    Allowed,
    Denied,
    Redirected,
}

impl std::fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessDecision::Allowed => write!(f, "ALLOWED"),
            AccessDecision::Denied => write!(f, "DENIED"),
            AccessDecision::Redirected => write!(f, "REDIRECTED"),
        }
    }
}

/// One gated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<String>,
    /// Display role (`employee` when the user has none).
    pub role: String,
    pub path: String,
    pub required: Vec<String>,
    pub require_all: bool,
    pub decision: AccessDecision,
}

/// Bounded, shared audit trail. The oldest entries are dropped first.
#[derive(Debug, Clone)]
pub struct AuditLog {
    entries: Arc<Mutex<VecDeque<AuditEntry>>>,
    capacity: usize,
}

impl AuditLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(1024)))),
            capacity,
        }
    }

    pub fn record(&self, entry: AuditEntry) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock().expect("audit log lock");
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// The most recent `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.lock().expect("audit log lock");
        entries.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("audit log lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Per-user access resolution
// ---------------------------------------------------------------------------

/// One [`AccessCache`] per user id, plus one for anonymous requests.
///
/// A cache recomputes only when the user record behind an id changes
/// (for example a session re-registered with a different role).
#[derive(Debug, Clone)]
pub struct AccessResolver {
    evaluator: PermissionEvaluator,
    caches: Arc<Mutex<HashMap<String, Arc<AccessCache>>>>,
    anonymous: Arc<AccessCache>,
}

impl AccessResolver {
    pub fn new(evaluator: PermissionEvaluator) -> Self {
        Self {
            anonymous: Arc::new(AccessCache::new(evaluator.clone())),
            evaluator,
            caches: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn resolve(&self, user: Option<&User>) -> Arc<Access> {
        let cache = match user {
            None => Arc::clone(&self.anonymous),
            Some(user) => {
                let mut caches = self.caches.lock().expect("access resolver lock");
                Arc::clone(
                    caches
                        .entry(user.id.clone())
                        .or_insert_with(|| Arc::new(AccessCache::new(self.evaluator.clone()))),
                )
            }
        };
        cache.resolve(user)
    }

    /// Total `Access` rebuilds across all users.
    pub fn recomputations(&self) -> u64 {
        let caches = self.caches.lock().expect("access resolver lock");
        caches.values().map(|c| c.recomputations()).sum::<u64>() + self.anonymous.recomputations()
    }

    pub fn cached_users(&self) -> usize {
        self.caches.lock().expect("access resolver lock").len()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Body of a 403 response.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthzError {
    pub error: String,
    pub code: u16,
    pub required_permissions: Vec<String>,
    pub require_all: bool,
}

impl AuthzError {
    pub fn forbidden(gate: &PermissionGate, role: &str) -> Self {
        let mode = if gate.require_all { "all of" } else { "any of" };
        Self {
            error: format!(
                "Role '{}' lacks {} the required permissions: {}",
                role,
                mode,
                gate.required_permissions.join(", ")
            ),
            code: 403,
            required_permissions: gate.required_permissions.clone(),
            require_all: gate.require_all,
        }
    }
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        (StatusCode::FORBIDDEN, Json(self)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Middleware
// ---------------------------------------------------------------------------

/// State for [`api_guard`].
#[derive(Clone)]
pub struct ApiGuard {
    pub state: AppState,
    pub gate: PermissionGate,
}

/// State for [`page_guard`].
#[derive(Clone)]
pub struct PageGuard {
    pub state: AppState,
    pub route: RouteGate,
}

fn current_access(state: &AppState, request: &Request) -> Arc<Access> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .and_then(|current| current.0.as_ref());
    state.access.resolve(user)
}

fn audit(state: &AppState, access: &Access, path: &str, gate: &PermissionGate, decision: AccessDecision) {
    let user_id = access.user().map(|u| u.id.clone());
    match decision {
        AccessDecision::Allowed => info!(
            user = user_id.as_deref().unwrap_or("<anonymous>"),
            role = access.role(),
            path,
            decision = %decision,
            "Access check"
        ),
        _ => warn!(
            user = user_id.as_deref().unwrap_or("<anonymous>"),
            role = access.role(),
            path,
            required = ?gate.required_permissions,
            require_all = gate.require_all,
            decision = %decision,
            "Access check"
        ),
    }
    state.audit_log.record(AuditEntry {
        timestamp: Utc::now(),
        user_id,
        role: access.role().to_string(),
        path: path.to_string(),
        required: gate.required_permissions.clone(),
        require_all: gate.require_all,
        decision,
    });
}

/// Reject with 403 unless the gate passes.
pub async fn api_guard(State(guard): State<ApiGuard>, request: Request, next: Next) -> Response {
    let access = current_access(&guard.state, &request);
    let path = request.uri().path().to_string();

    if guard.gate.allows(&access) {
        audit(&guard.state, &access, &path, &guard.gate, AccessDecision::Allowed);
        next.run(request).await
    } else {
        audit(&guard.state, &access, &path, &guard.gate, AccessDecision::Denied);
        AuthzError::forbidden(&guard.gate, access.role()).into_response()
    }
}

/// Redirect to the fallback path unless the route gate passes.
pub async fn page_guard(State(guard): State<PageGuard>, request: Request, next: Next) -> Response {
    let access = current_access(&guard.state, &request);
    let path = request.uri().path().to_string();

    match guard.route.decide(&access) {
        RouteDecision::Render => {
            audit(&guard.state, &access, &path, &guard.route.gate, AccessDecision::Allowed);
            next.run(request).await
        }
        RouteDecision::Redirect(target) => {
            audit(&guard.state, &access, &path, &guard.route.gate, AccessDecision::Redirected);
            Redirect::to(&target).into_response()
        }
    }
}
