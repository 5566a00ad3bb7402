// SPDX-License-Identifier: PMPL-1.0-or-later
//! Clearance API
//!
//! HTTP service over the Clearance permission model: catalog and role
//! listings, the caller's resolved access, ad-hoc permission checks,
//! permission-gated pages and API routes, and the per-user unsaved-changes
//! guard.

pub mod auth;
pub mod navigation;
pub mod rbac;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use clearance_core::{
    LeaveDecision, LeaveOutcome, NavigationGuard, NavigationState, PermissionError,
    PermissionEvaluator, PermissionGate, PermissionInfo, Role, RouteGate, UnknownPermissionPolicy,
    DEFAULT_FALLBACK_PATH,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

pub use auth::{auth_middleware, CurrentSession, CurrentUser, SessionRegistry};
pub use navigation::NavigationStore;
pub use rbac::{AccessDecision, AccessResolver, AuditEntry, AuditLog, AuthzError};

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(ErrorResponse {
            error: message,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}

impl From<PermissionError> for ApiError {
    fn from(err: PermissionError) -> Self {
        match err {
            PermissionError::InvalidTransition { .. } => ApiError::Conflict(err.to_string()),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

/// API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Where denied pages redirect
    pub fallback_path: String,
    /// Treatment of permission keys missing from the catalog
    pub unknown_permission_policy: UnknownPermissionPolicy,
    /// Maximum retained audit entries
    pub audit_capacity: usize,
    /// Whether requests without a session token are served
    pub allow_anonymous: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            fallback_path: DEFAULT_FALLBACK_PATH.to_string(),
            unknown_permission_policy: UnknownPermissionPolicy::Allow,
            audit_capacity: 10_000,
            allow_anonymous: true,
        }
    }
}

impl ApiConfig {
    /// Defaults overridden by `CLEARANCE_*` environment variables.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(host) = lookup("CLEARANCE_HOST").filter(|h| !h.trim().is_empty()) {
            config.host = host.trim().to_string();
        }
        if let Some(port) = lookup("CLEARANCE_PORT") {
            match port.trim().parse() {
                Ok(port) => config.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid CLEARANCE_PORT"),
            }
        }
        if let Some(path) = lookup("CLEARANCE_FALLBACK_PATH") {
            if path.starts_with('/') {
                config.fallback_path = path;
            } else {
                warn!(value = %path, "Ignoring CLEARANCE_FALLBACK_PATH (must start with '/')");
            }
        }
        if let Some(policy) = lookup("CLEARANCE_UNKNOWN_PERMISSION_POLICY") {
            match policy.parse() {
                Ok(policy) => config.unknown_permission_policy = policy,
                Err(e) => warn!(error = %e, "Ignoring CLEARANCE_UNKNOWN_PERMISSION_POLICY"),
            }
        }
        if let Some(capacity) = lookup("CLEARANCE_AUDIT_CAPACITY") {
            match capacity.trim().parse() {
                Ok(capacity) => config.audit_capacity = capacity,
                Err(_) => warn!(value = %capacity, "Ignoring invalid CLEARANCE_AUDIT_CAPACITY"),
            }
        }
        if let Some(flag) = lookup("CLEARANCE_ALLOW_ANONYMOUS") {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => config.allow_anonymous = true,
                "0" | "false" | "no" => config.allow_anonymous = false,
                _ => warn!(value = %flag, "Ignoring invalid CLEARANCE_ALLOW_ANONYMOUS"),
            }
        }

        config
    }
}

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub start_time: Instant,
    pub config: Arc<ApiConfig>,
    pub evaluator: PermissionEvaluator,
    pub sessions: SessionRegistry,
    pub access: AccessResolver,
    pub audit_log: AuditLog,
    pub navigation: NavigationStore,
}

impl AppState {
    pub fn new(config: ApiConfig) -> Self {
        let evaluator = PermissionEvaluator::new(config.unknown_permission_policy);
        Self {
            start_time: Instant::now(),
            access: AccessResolver::new(evaluator.clone()),
            audit_log: AuditLog::new(config.audit_capacity),
            sessions: SessionRegistry::new(),
            navigation: NavigationStore::new(),
            evaluator,
            config: Arc::new(config),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoleResponse {
    pub role: Role,
    pub rank: u8,
    pub full_access: bool,
    pub permissions: Vec<String>,
}

/// The caller's resolved access
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessResponse {
    pub user_id: Option<String>,
    pub role: String,
    pub is_admin: bool,
    pub is_super_admin: bool,
    pub is_manager: bool,
    pub is_employee: bool,
    pub can_set_job_complete: bool,
    pub granted: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckRequest {
    #[serde(alias = "requiredPermissions")]
    pub permissions: Vec<String>,
    #[serde(default, alias = "requireAll")]
    pub require_all: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    pub allowed: bool,
    pub role: String,
    /// Requested keys missing from the catalog
    pub unknown: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NavigationResponse {
    #[serde(flatten)]
    pub state: NavigationState,
    pub has_unsaved_changes: bool,
}

impl From<&NavigationGuard> for NavigationResponse {
    fn from(guard: &NavigationGuard) -> Self {
        Self {
            state: guard.state().clone(),
            has_unsaved_changes: guard.has_unsaved_changes(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LeaveRequest {
    pub target: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaveResponse {
    #[serde(flatten)]
    pub decision: LeaveDecision,
    pub navigation: NavigationResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OutcomeResponse {
    #[serde(flatten)]
    pub outcome: LeaveOutcome,
    pub navigation: NavigationResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub user_id: String,
    /// Whether a navigation guard was discarded with the session
    pub cleared_navigation: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageResponse {
    pub page: String,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the API router
pub fn build_router(state: AppState) -> Router {
    let audit_guard = rbac::ApiGuard {
        state: state.clone(),
        gate: PermissionGate::all_of(["admin.view"]),
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/api/permissions", get(permissions_handler))
        .route("/api/roles", get(roles_handler))
        .route("/api/me/access", get(me_access_handler))
        .route("/api/session/logout", post(logout_handler))
        .route("/api/access/check", post(check_handler))
        .route(
            "/api/audit",
            get(audit_handler)
                .route_layer(middleware::from_fn_with_state(audit_guard, rbac::api_guard)),
        )
        .route("/api/navigation", get(navigation_handler))
        .route("/api/navigation/dirty", post(mark_dirty_handler))
        .route("/api/navigation/saved", post(mark_saved_handler))
        .route("/api/navigation/leave", post(request_leave_handler))
        .route("/api/navigation/confirm", post(confirm_leave_handler))
        .route("/api/navigation/cancel", post(cancel_leave_handler))
        .route("/dashboard", get(dashboard_handler))
        .merge(gated_page(&state, "/admin", PermissionGate::all_of(["admin.view"])))
        .merge(gated_page(
            &state,
            "/invoices/approvals",
            PermissionGate::any_of(["invoices.approve"]),
        ))
        .merge(gated_page(&state, "/users", PermissionGate::any_of(["users.view"])))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

/// A page that redirects to the fallback path when `gate` denies.
fn gated_page(state: &AppState, path: &'static str, gate: PermissionGate) -> Router<AppState> {
    let guard = rbac::PageGuard {
        state: state.clone(),
        route: RouteGate::new(gate).with_fallback(state.config.fallback_path.clone()),
    };

    Router::new()
        .route(
            path,
            get(move |Extension(user): Extension<CurrentUser>, State(state): State<AppState>| async move {
                let access = state.access.resolve(user.0.as_ref());
                Json(PageResponse {
                    page: path.to_string(),
                    role: access.role().to_string(),
                })
            }),
        )
        .route_layer(middleware::from_fn_with_state(guard, rbac::page_guard))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[instrument(skip(state))]
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

#[instrument]
async fn ready_handler() -> StatusCode {
    StatusCode::OK
}

#[instrument(skip(state))]
async fn permissions_handler(State(state): State<AppState>) -> Json<Vec<PermissionInfo>> {
    Json(state.evaluator.registry().entries().to_vec())
}

#[instrument(skip(state))]
async fn roles_handler(State(state): State<AppState>) -> Json<Vec<RoleResponse>> {
    let roles = Role::ALL
        .iter()
        .map(|&role| RoleResponse {
            role,
            rank: role.rank(),
            full_access: role.has_full_access(),
            permissions: state.evaluator.roles().permissions_for(role).iter().cloned().collect(),
        })
        .collect();
    Json(roles)
}

#[instrument(skip(state, user))]
async fn me_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<AccessResponse> {
    let access = state.access.resolve(user.0.as_ref());
    Json(AccessResponse {
        user_id: access.user().map(|u| u.id.clone()),
        role: access.role().to_string(),
        is_admin: access.is_admin(),
        is_super_admin: access.is_super_admin(),
        is_manager: access.is_manager(),
        is_employee: access.is_employee(),
        can_set_job_complete: access.user().is_some_and(|u| u.can_set_job_complete),
        granted: access.granted().into_iter().map(str::to_string).collect(),
    })
}

/// Revoke the calling session and drop its unsaved-changes guard.
#[instrument(skip(state, user, session))]
async fn logout_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Extension(session): Extension<CurrentSession>,
) -> Result<Json<LogoutResponse>, ApiError> {
    let (Some(user), Some(token_hash)) = (user.0, session.0) else {
        return Err(ApiError::Unauthorized("Logout requires a session".to_string()));
    };
    if !state.sessions.revoke(&token_hash) {
        return Err(ApiError::NotFound("Session not found".to_string()));
    }
    let cleared_navigation = state.navigation.clear(&user.id);
    info!(user = %user.id, cleared_navigation, "Logged out");

    Ok(Json(LogoutResponse {
        user_id: user.id,
        cleared_navigation,
    }))
}

#[instrument(skip(state, user, request))]
async fn check_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CheckRequest>,
) -> Json<CheckResponse> {
    let access = state.access.resolve(user.0.as_ref());
    let gate = PermissionGate {
        required_permissions: request.permissions,
        require_all: request.require_all,
    };
    let registry = state.evaluator.registry();
    let unknown = gate
        .required_permissions
        .iter()
        .filter(|key| !registry.is_known_permission(key))
        .cloned()
        .collect();

    Json(CheckResponse {
        allowed: gate.allows(&access),
        role: access.role().to_string(),
        unknown,
    })
}

#[instrument(skip(state))]
async fn audit_handler(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> Json<Vec<AuditEntry>> {
    Json(state.audit_log.recent(query.limit.unwrap_or(100)))
}

#[instrument(skip(state, user))]
async fn dashboard_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<PageResponse> {
    let access = state.access.resolve(user.0.as_ref());
    Json(PageResponse {
        page: "/dashboard".to_string(),
        role: access.role().to_string(),
    })
}

fn require_user(user: &CurrentUser) -> Result<&str, ApiError> {
    user.0
        .as_ref()
        .map(|u| u.id.as_str())
        .ok_or_else(|| ApiError::Unauthorized("Navigation guard requires a session".to_string()))
}

#[instrument(skip(state, user))]
async fn navigation_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<NavigationResponse>, ApiError> {
    let user_id = require_user(&user)?;
    Ok(Json(NavigationResponse::from(&state.navigation.get(user_id))))
}

#[instrument(skip(state, user))]
async fn mark_dirty_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<NavigationResponse>, ApiError> {
    let user_id = require_user(&user)?;
    let ((), guard) = state.navigation.apply(user_id, |g| g.mark_dirty())?;
    Ok(Json(NavigationResponse::from(&guard)))
}

#[instrument(skip(state, user))]
async fn mark_saved_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<NavigationResponse>, ApiError> {
    let user_id = require_user(&user)?;
    let ((), guard) = state.navigation.apply(user_id, |g| g.mark_saved())?;
    Ok(Json(NavigationResponse::from(&guard)))
}

#[instrument(skip(state, user, request))]
async fn request_leave_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<LeaveRequest>,
) -> Result<Json<LeaveResponse>, ApiError> {
    let user_id = require_user(&user)?;
    if request.target.trim().is_empty() {
        return Err(ApiError::BadRequest("Leave target must not be empty".to_string()));
    }
    let (decision, guard) = state
        .navigation
        .apply(user_id, |g| g.request_leave(request.target))?;
    Ok(Json(LeaveResponse {
        decision,
        navigation: NavigationResponse::from(&guard),
    }))
}

#[instrument(skip(state, user))]
async fn confirm_leave_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<OutcomeResponse>, ApiError> {
    let user_id = require_user(&user)?;
    let (outcome, guard) = state.navigation.apply(user_id, |g| g.confirm_leave())?;
    Ok(Json(OutcomeResponse {
        outcome,
        navigation: NavigationResponse::from(&guard),
    }))
}

#[instrument(skip(state, user))]
async fn cancel_leave_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<OutcomeResponse>, ApiError> {
    let user_id = require_user(&user)?;
    let (outcome, guard) = state.navigation.apply(user_id, |g| g.cancel_leave())?;
    Ok(Json(OutcomeResponse {
        outcome,
        navigation: NavigationResponse::from(&guard),
    }))
}

/// Start the API server
pub async fn serve(config: ApiConfig) -> Result<(), std::io::Error> {
    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config);

    if let Ok(spec) = std::env::var("CLEARANCE_SESSIONS") {
        let count = state.sessions.seed(&spec);
        info!(count, "Seeded sessions from CLEARANCE_SESSIONS");
    }

    let app = build_router(state);

    info!("Starting Clearance API server on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
