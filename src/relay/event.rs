//! Topic event types for signaling fan-out
//!
//! This module defines the messages delivered to topic subscribers.

use bytes::Bytes;

use crate::registry::SessionId;

/// A signaling message relayed through a topic
///
/// The payload is opaque: an SDP offer/answer, an ICE candidate, or whatever
/// else the clients agreed on. The relay forwards it byte-for-byte and never
/// inspects it. Cheap to clone: `Bytes` is reference counted, so fan-out to
/// many subscribers shares one allocation.
#[derive(Debug, Clone)]
pub struct SignalingMessage {
    /// Session this message is scoped to
    pub session_id: SessionId,

    /// Verified identity of the sender
    pub sender: String,

    /// Opaque signaling payload
    pub payload: Bytes,
}

impl SignalingMessage {
    /// Create a new signaling message
    pub fn new(session_id: SessionId, sender: impl Into<String>, payload: Bytes) -> Self {
        Self {
            session_id,
            sender: sender.into(),
            payload,
        }
    }
}

/// An event delivered to a topic subscriber
#[derive(Debug, Clone)]
pub enum TopicEvent {
    /// A relayed signaling message from another participant (or the sender's
    /// own other subscriptions; the relay does not special-case self-messages)
    Signal(SignalingMessage),

    /// Terminal notification: the session was ended and this subscription is
    /// being evicted. No further events follow.
    SessionEnded {
        /// The session that ended
        session_id: SessionId,
    },
}

impl TopicEvent {
    /// Whether this event terminates the subscription
    pub fn is_terminal(&self) -> bool {
        matches!(self, TopicEvent::SessionEnded { .. })
    }
}
