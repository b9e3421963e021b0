//! Session types and lifecycle state
//!
//! This module defines the per-session state stored in the registry.

use std::time::Instant;

/// Unique identifier for a session
///
/// Allocated by the registry on creation and never reused within a process
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a session
///
/// Transitions one way only: `Active -> Ended`. An ended session stays in
/// the registry so late joiners can tell "ended" from "never existed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Session is open for joining and relaying
    Active,
    /// Session was ended by its owner; terminal
    Ended,
}

/// A single teaching session
///
/// `id`, `title` and `owner` are immutable after creation; only `state`
/// moves, and only forward.
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session ID
    pub id: SessionId,

    /// Display title, set at creation
    pub title: String,

    /// Verified identity of the creator
    pub owner: String,

    /// Current lifecycle state
    pub state: SessionState,

    /// When the session was created
    pub created_at: Instant,
}

impl Session {
    /// Create a new active session
    pub(super) fn new(id: SessionId, title: String, owner: String) -> Self {
        Self {
            id,
            title,
            owner,
            state: SessionState::Active,
            created_at: Instant::now(),
        }
    }

    /// Check if the session is still active
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// Check if the given identity owns this session
    pub fn is_owner(&self, identity: &str) -> bool {
        self.owner == identity
    }

    /// Get session age
    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }
}
