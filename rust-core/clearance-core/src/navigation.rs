// SPDX-License-Identifier: PMPL-1.0-or-later
//! Unsaved-changes navigation guard.
//!
//! Tracks whether the user has pending edits and turns "navigate away" into
//! an explicit confirmation step:
//!
//! ```text
//!   Clean ──mark_dirty──▶ Dirty ──request_leave──▶ ConfirmingLeave
//!     ▲                     │  ▲                       │        │
//!     └─────mark_saved──────┘  └───cancel_leave────────┘        │
//!     ▲                                                         │
//!     └──────────────────────confirm_leave (Discarded)──────────┘
//! ```
//!
//! A leave request from `Clean` proceeds immediately.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PermissionError, PermissionResult};

/// Current guard state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NavigationState {
    #[default]
    Clean,
    Dirty,
    ConfirmingLeave { target: String },
}

impl NavigationState {
    fn label(&self) -> &'static str {
        match self {
            NavigationState::Clean => "clean",
            NavigationState::Dirty => "dirty",
            NavigationState::ConfirmingLeave { .. } => "confirming leave",
        }
    }
}

/// Answer to a leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum LeaveDecision {
    /// Nothing to lose; navigate to `target` now.
    Proceed { target: String },
    /// Ask the user before discarding edits.
    NeedsConfirmation { target: String },
}

/// How a confirmation prompt was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LeaveOutcome {
    /// Edits dropped; navigate to `target`.
    Discarded { target: String },
    /// User stayed; edits kept.
    Cancelled,
}

/// Per-user unsaved-changes state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationGuard {
    state: NavigationState,
}

impl NavigationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn has_unsaved_changes(&self) -> bool {
        !matches!(self.state, NavigationState::Clean)
    }

    /// Record an edit. Idempotent while dirty.
    pub fn mark_dirty(&mut self) -> PermissionResult<()> {
        match self.state {
            NavigationState::Clean | NavigationState::Dirty => {
                self.state = NavigationState::Dirty;
                Ok(())
            }
            NavigationState::ConfirmingLeave { .. } => Err(self.invalid("mark dirty")),
        }
    }

    /// Record a successful save.
    pub fn mark_saved(&mut self) -> PermissionResult<()> {
        match self.state {
            NavigationState::Clean | NavigationState::Dirty => {
                self.state = NavigationState::Clean;
                Ok(())
            }
            NavigationState::ConfirmingLeave { .. } => Err(self.invalid("mark saved")),
        }
    }

    /// Ask to navigate to `target`.
    pub fn request_leave(&mut self, target: impl Into<String>) -> PermissionResult<LeaveDecision> {
        let target = target.into();
        match self.state {
            NavigationState::Clean => {
                debug!(target = %target, "Leave requested with no pending edits");
                Ok(LeaveDecision::Proceed { target })
            }
            NavigationState::Dirty => {
                info!(target = %target, "Leave requested with unsaved changes");
                self.state = NavigationState::ConfirmingLeave {
                    target: target.clone(),
                };
                Ok(LeaveDecision::NeedsConfirmation { target })
            }
            NavigationState::ConfirmingLeave { .. } => Err(self.invalid("request leave")),
        }
    }

    /// Discard edits and leave to the pending target.
    pub fn confirm_leave(&mut self) -> PermissionResult<LeaveOutcome> {
        match std::mem::take(&mut self.state) {
            NavigationState::ConfirmingLeave { target } => {
                info!(target = %target, "Unsaved changes discarded");
                Ok(LeaveOutcome::Discarded { target })
            }
            other => {
                self.state = other;
                Err(self.invalid("confirm leave"))
            }
        }
    }

    /// Stay on the page and keep edits.
    pub fn cancel_leave(&mut self) -> PermissionResult<LeaveOutcome> {
        match self.state {
            NavigationState::ConfirmingLeave { .. } => {
                debug!("Leave cancelled");
                self.state = NavigationState::Dirty;
                Ok(LeaveOutcome::Cancelled)
            }
            _ => Err(self.invalid("cancel leave")),
        }
    }

    fn invalid(&self, event: &'static str) -> PermissionError {
        PermissionError::InvalidTransition {
            state: self.state.label(),
            event,
        }
    }
}
