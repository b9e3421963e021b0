//! Registry error types
//!
//! Error types for session registry operations.

use super::session::SessionId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Title failed validation (empty or too long)
    InvalidTitle,
    /// No session with this ID was ever created
    SessionNotFound(SessionId),
    /// Session exists but has already ended
    SessionEnded(SessionId),
    /// Caller is not the session owner
    NotOwner(SessionId),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::InvalidTitle => write!(f, "Invalid session title"),
            RegistryError::SessionNotFound(id) => write!(f, "Session not found: {}", id),
            RegistryError::SessionEnded(id) => write!(f, "Session has ended: {}", id),
            RegistryError::NotOwner(id) => write!(f, "Caller does not own session: {}", id),
        }
    }
}

impl std::error::Error for RegistryError {}
