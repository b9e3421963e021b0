//! Crate-level error type
//!
//! Registry and relay return their own typed errors; the gateway wraps both
//! behind this one type so callers can use `?` and still distinguish the
//! outcomes that matter ("ended" vs "not found" vs "not yours").

use crate::registry::RegistryError;
use crate::relay::RelayError;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Session registry error
    Registry(RegistryError),
    /// Topic relay error
    Relay(RelayError),
}

impl Error {
    /// Whether this error means the session does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Registry(RegistryError::SessionNotFound(_))
                | Error::Relay(RelayError::SessionNotFound(_))
        )
    }

    /// Whether this error means the session exists but has ended
    ///
    /// Kept distinct from [`Error::is_not_found`] so a client can show
    /// "this class has ended" rather than "class does not exist".
    pub fn is_ended(&self) -> bool {
        matches!(
            self,
            Error::Registry(RegistryError::SessionEnded(_))
                | Error::Relay(RelayError::SessionEnded(_))
        )
    }

    /// Whether this error means the caller lacks ownership
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Error::Registry(RegistryError::NotOwner(_)))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Registry(e) => write!(f, "Registry error: {}", e),
            Error::Relay(e) => write!(f, "Relay error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Registry(e) => Some(e),
            Error::Relay(e) => Some(e),
        }
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::Registry(e)
    }
}

impl From<RelayError> for Error {
    fn from(e: RelayError) -> Self {
        Error::Relay(e)
    }
}
