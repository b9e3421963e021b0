//! Session gateway
//!
//! Thin, stateless composition of the [`crate::registry`] and
//! [`crate::relay`]: it validates that a session exists and is active before
//! allowing a join or a publish, and translates transport-level join/leave
//! events into registry and relay calls. It holds no state of its own.

use std::sync::Arc;

use bytes::Bytes;

use crate::error::Result;
use crate::registry::{RegistryError, Session, SessionId, SessionRegistry};
use crate::relay::{ParticipantChannel, Subscription, TopicRelay};

/// Resolves a verified identity to a human-readable display name
///
/// Identity and profile storage are external collaborators; the gateway only
/// needs this one projection when listing sessions.
pub trait IdentityDirectory: Send + Sync {
    /// Get the display name for an identity
    fn display_name(&self, identity: &str) -> String;
}

/// Directory that displays the identity string itself
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughDirectory;

impl IdentityDirectory for PassthroughDirectory {
    fn display_name(&self, identity: &str) -> String {
        identity.to_string()
    }
}

/// Public projection of a session for listing
#[derive(Debug, Clone)]
pub struct SessionView {
    /// Session ID
    pub id: SessionId,
    /// Session title
    pub title: String,
    /// Display name of the session owner
    pub owner_display_name: String,
}

/// Gateway composing the session registry and the topic relay
pub struct SessionGateway<D: IdentityDirectory = PassthroughDirectory> {
    registry: Arc<SessionRegistry>,
    relay: Arc<TopicRelay>,
    directory: Arc<D>,
}

impl SessionGateway<PassthroughDirectory> {
    /// Create a gateway with the passthrough identity directory
    pub fn new(registry: Arc<SessionRegistry>, relay: Arc<TopicRelay>) -> Self {
        Self::with_directory(registry, relay, Arc::new(PassthroughDirectory))
    }
}

impl<D: IdentityDirectory> SessionGateway<D> {
    /// Create a gateway with a custom identity directory
    pub fn with_directory(
        registry: Arc<SessionRegistry>,
        relay: Arc<TopicRelay>,
        directory: Arc<D>,
    ) -> Self {
        Self {
            registry,
            relay,
            directory,
        }
    }

    /// Get a reference to the session registry
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Get a reference to the topic relay
    pub fn relay(&self) -> &Arc<TopicRelay> {
        &self.relay
    }

    /// Create a new session owned by the caller
    pub async fn create_session(&self, title: &str, caller: &str) -> Result<Session> {
        Ok(self.registry.create(title, caller).await?)
    }

    /// List active sessions as public views
    pub async fn list_active_sessions(&self) -> Vec<SessionView> {
        self.registry
            .list_active()
            .await
            .into_iter()
            .map(|session| SessionView {
                id: session.id,
                title: session.title,
                owner_display_name: self.directory.display_name(&session.owner),
            })
            .collect()
    }

    /// Join a session topic
    ///
    /// The channel is the participant's delivery endpoint supplied by the
    /// transport. A join against an ended session fails with a
    /// `SessionEnded` error, distinguishable from `SessionNotFound`.
    pub async fn join(
        &self,
        session_id: SessionId,
        identity: &str,
        channel: Arc<dyn ParticipantChannel>,
    ) -> Result<Subscription> {
        let session = self.registry.get(session_id).await?;
        if !session.is_active() {
            return Err(RegistryError::SessionEnded(session_id).into());
        }

        // The relay re-validates under the topic lock, which closes the race
        // against a concurrent end_session.
        Ok(self.relay.subscribe(session_id, identity, channel).await?)
    }

    /// Leave a session topic
    ///
    /// Called by the transport when a participant disconnects or explicitly
    /// leaves. Idempotent, like the underlying unsubscribe.
    pub async fn leave(&self, subscription: &Subscription) {
        self.relay.unsubscribe(subscription).await;
    }

    /// Relay a signaling payload to all subscribers of a session topic
    ///
    /// Returns the number of subscribers the payload was delivered to.
    pub async fn relay_message(
        &self,
        session_id: SessionId,
        sender: &str,
        payload: Bytes,
    ) -> Result<usize> {
        Ok(self.relay.publish(session_id, sender, payload).await?)
    }

    /// End a session and evict its subscribers
    ///
    /// Only the owner may end a session. The registry transition happens
    /// first; eviction runs before this method returns, so no join can
    /// succeed afterwards. Returns the number of subscribers evicted.
    pub async fn end_session(&self, session_id: SessionId, caller: &str) -> Result<usize> {
        self.registry.end(session_id, caller).await?;
        Ok(self.relay.force_evict(session_id).await)
    }
}
