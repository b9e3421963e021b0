//! Session registry implementation
//!
//! The central registry that tracks every session created in this process
//! and owns the `Active -> Ended` lifecycle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::stats::RegistryStats;

use super::config::RegistryConfig;
use super::error::RegistryError;
use super::session::{Session, SessionId, SessionState};

/// Central registry for all sessions
///
/// Thread-safe via `RwLock`. The outer map lock is held only for lookup and
/// insert; each session mutates under its own entry lock, so operations on
/// different sessions never contend.
///
/// Sessions are never removed: ending a session is a logical transition, not
/// a deletion, so a late `get` can still report "ended" rather than
/// "not found".
pub struct SessionRegistry {
    /// Map of session ID to session entry
    sessions: RwLock<HashMap<SessionId, Arc<RwLock<Session>>>>,

    /// Next session ID to allocate
    next_id: AtomicU64,

    /// Configuration
    config: RegistryConfig,
}

impl SessionRegistry {
    /// Create a new session registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new session registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Create a new session owned by `owner`
    ///
    /// The session starts `Active` and enters the active-session index
    /// immediately. Fails with `InvalidTitle` if the trimmed title is empty
    /// or exceeds the configured length.
    pub async fn create(&self, title: &str, owner: &str) -> Result<Session, RegistryError> {
        if title.trim().is_empty() || title.len() > self.config.max_title_len {
            return Err(RegistryError::InvalidTitle);
        }

        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let session = Session::new(id, title.to_string(), owner.to_string());

        let mut sessions = self.sessions.write().await;
        sessions.insert(id, Arc::new(RwLock::new(session.clone())));

        tracing::info!(
            session = %id,
            owner = %owner,
            title = %session.title,
            "Session created"
        );

        Ok(session)
    }

    /// Get a snapshot of a session by ID
    pub async fn get(&self, id: SessionId) -> Result<Session, RegistryError> {
        let sessions = self.sessions.read().await;

        let entry_arc = sessions
            .get(&id)
            .ok_or(RegistryError::SessionNotFound(id))?;

        let entry = entry_arc.read().await;
        Ok(entry.clone())
    }

    /// List all currently active sessions
    ///
    /// Returns a point-in-time snapshot: the returned vector is safe to
    /// iterate while the registry continues to mutate. A session whose `end`
    /// call has already returned never appears.
    pub async fn list_active(&self) -> Vec<Session> {
        let sessions = self.sessions.read().await;

        let mut active = Vec::new();
        for entry_arc in sessions.values() {
            let entry = entry_arc.read().await;
            if entry.is_active() {
                active.push(entry.clone());
            }
        }

        active
    }

    /// End a session
    ///
    /// Only the owner may end a session. The transition is one-way: a second
    /// `end` fails with `SessionEnded` and must not trigger another eviction
    /// in the relay. Returns the ended session snapshot on success.
    pub async fn end(&self, id: SessionId, caller: &str) -> Result<Session, RegistryError> {
        let sessions = self.sessions.read().await;

        let entry_arc = sessions
            .get(&id)
            .ok_or(RegistryError::SessionNotFound(id))?;

        let mut entry = entry_arc.write().await;

        if !entry.is_owner(caller) {
            tracing::warn!(
                session = %id,
                owner = %entry.owner,
                caller = %caller,
                "End rejected: caller is not the owner"
            );
            return Err(RegistryError::NotOwner(id));
        }

        if entry.state == SessionState::Ended {
            return Err(RegistryError::SessionEnded(id));
        }

        entry.state = SessionState::Ended;

        tracing::info!(
            session = %id,
            owner = %entry.owner,
            "Session ended"
        );

        Ok(entry.clone())
    }

    /// Get total number of sessions ever created (active and ended)
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Get registry statistics
    pub async fn stats(&self) -> RegistryStats {
        let sessions = self.sessions.read().await;

        let mut active = 0;
        for entry_arc in sessions.values() {
            if entry_arc.read().await.is_active() {
                active += 1;
            }
        }

        RegistryStats {
            total_sessions: sessions.len(),
            active_sessions: active,
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
