//! Relay error types
//!
//! Error types for topic relay operations.

use crate::registry::SessionId;

/// Error type for relay operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// No session with this ID was ever created
    SessionNotFound(SessionId),
    /// Session exists but has already ended
    SessionEnded(SessionId),
    /// Topic is at its configured subscriber limit
    TopicFull(SessionId),
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::SessionNotFound(id) => write!(f, "Session not found: {}", id),
            RelayError::SessionEnded(id) => write!(f, "Session has ended: {}", id),
            RelayError::TopicFull(id) => write!(f, "Topic is full: {}", id),
        }
    }
}

impl std::error::Error for RelayError {}
