//! Session registry for lifecycle tracking
//!
//! The registry owns which sessions exist, which are joinable, and who may
//! end them. It is deliberately small: create, look up, list active, end.
//! Relaying signaling among a session's participants lives in
//! [`crate::relay`]; this module only answers "does this session exist and
//! is it still active".

pub mod config;
pub mod error;
pub mod session;
pub mod store;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use session::{Session, SessionId, SessionState};
pub use store::SessionRegistry;
