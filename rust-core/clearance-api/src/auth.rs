// SPDX-License-Identifier: PMPL-1.0-or-later
//! Session authentication for the Clearance API.
//!
//! Resolves the request's user from a session token passed via
//! `Authorization: Bearer <token>` or `X-Session-Token`. The resolved user
//! (or none, for anonymous requests) is attached to the request as a
//! [`CurrentUser`] extension for the permission gates downstream.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use clearance_core::User;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::{AppState, ErrorResponse};

/// Header carrying a session token when `Authorization` is not used.
pub const SESSION_HEADER: &str = "x-session-token";

/// The user behind the current request, if any.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

/// Token hash of the session that authenticated the current request, if any.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Option<String>);

/// A registered session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEntry {
    /// SHA-256 hash of the session token (plaintext is never stored).
    pub token_hash: String,
    pub user: User,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

/// In-memory session registry keyed by token hash.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token` for `user`, replacing any session with the same
    /// token. Returns the token hash.
    pub fn register(&self, token: &str, user: User) -> String {
        let hash = hash_token(token);
        info!(user = %user.id, role = ?user.role, "Session registered");
        let entry = SessionEntry {
            token_hash: hash.clone(),
            user,
            created_at: Utc::now(),
            active: true,
        };
        let mut sessions = self.sessions.lock().expect("session registry lock");
        sessions.insert(hash.clone(), entry);
        hash
    }

    /// The user for an active session token.
    pub fn validate(&self, token: &str) -> Option<User> {
        self.lookup(&hash_token(token))
    }

    /// The user for an active session, by token hash.
    pub fn lookup(&self, token_hash: &str) -> Option<User> {
        let sessions = self.sessions.lock().expect("session registry lock");
        sessions
            .get(token_hash)
            .filter(|entry| entry.active)
            .map(|entry| entry.user.clone())
    }

    /// Deactivate a session by its token hash.
    pub fn revoke(&self, token_hash: &str) -> bool {
        let mut sessions = self.sessions.lock().expect("session registry lock");
        match sessions.get_mut(token_hash) {
            Some(entry) => {
                info!(user = %entry.user.id, "Session revoked");
                entry.active = false;
                true
            }
            None => false,
        }
    }

    /// All sessions (hashes only).
    pub fn list(&self) -> Vec<SessionEntry> {
        let sessions = self.sessions.lock().expect("session registry lock");
        sessions.values().cloned().collect()
    }

    /// Seed sessions from a `token:user_id:role[,...]` list.
    ///
    /// Malformed entries are skipped with a warning. Returns how many
    /// sessions were registered.
    pub fn seed(&self, spec: &str) -> usize {
        let mut count = 0;
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let parts: Vec<&str> = entry.splitn(3, ':').map(str::trim).collect();
            match parts.as_slice() {
                [token, user_id, role] if !token.is_empty() && !user_id.is_empty() => {
                    let user = if role.is_empty() {
                        User::without_role(*user_id)
                    } else {
                        User::new(*user_id, *role)
                    };
                    self.register(token, user);
                    count += 1;
                }
                _ => warn!("Invalid session entry (expected token:user_id:role)"),
            }
        }
        count
    }
}

/// Axum middleware attaching [`CurrentUser`] and [`CurrentSession`] to every
/// request.
///
/// 1. `/health` and `/ready` pass through untouched.
/// 2. A valid token attaches its user; an invalid one is rejected with 401.
/// 3. No token attaches no user when anonymous access is allowed, otherwise
///    the request is rejected with 401.
pub async fn auth_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if path == "/health" || path == "/ready" {
        return next.run(request).await;
    }

    let session = match extract_session(&request, &state.sessions) {
        Ok(session) => session,
        Err(response) => return response,
    };
    let (token_hash, user) = match session {
        Some((token_hash, user)) => (Some(token_hash), Some(user)),
        None => (None, None),
    };

    if user.is_none() && !state.config.allow_anonymous {
        return (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Bearer")],
            Json(ErrorResponse {
                error: "Authentication required. Provide Authorization: Bearer <token> or X-Session-Token".to_string(),
                code: 401,
            }),
        )
            .into_response();
    }

    request.extensions_mut().insert(CurrentSession(token_hash));
    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}

/// Read and validate the session token, if one was sent.
fn extract_session(
    request: &Request,
    sessions: &SessionRegistry,
) -> Result<Option<(String, User)>, Response> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .or_else(|| {
            request
                .headers()
                .get(SESSION_HEADER)
                .and_then(|v| v.to_str().ok())
        });

    let Some(token) = token else {
        debug!("Anonymous request");
        return Ok(None);
    };

    let token_hash = hash_token(token.trim());
    match sessions.lookup(&token_hash) {
        Some(user) => {
            debug!(user = %user.id, role = ?user.role, "Session authenticated");
            Ok(Some((token_hash, user)))
        }
        None => {
            warn!("Rejected unknown or revoked session token");
            Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Invalid session token".to_string(),
                    code: 401,
                }),
            )
                .into_response())
        }
    }
}

/// Hash a session token with SHA-256 for storage.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
