//! Topic entry and subscription types
//!
//! This module defines the per-session fan-out state stored in the relay.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::registry::SessionId;

use super::channel::ParticipantChannel;

/// Unique identifier for one subscription
///
/// A single identity may hold several concurrent subscriptions (one per
/// device); each gets its own ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle returned by `subscribe`, consumed by `unsubscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    /// The subscription's own ID
    pub id: SubscriptionId,

    /// Session the subscription belongs to
    pub session_id: SessionId,
}

/// One subscriber within a topic
pub(super) struct Subscriber {
    /// Verified identity of the participant
    pub identity: String,

    /// Non-owning delivery handle supplied by the transport
    pub channel: Arc<dyn ParticipantChannel>,
}

/// Per-session fan-out state
///
/// Created lazily on first subscribe. Once `closed` is set the entry is a
/// tombstone: it stays in the map for the process lifetime (mirroring the
/// registry's logical end) and rejects every later subscribe, which is what
/// makes "no subscribe succeeds after `end` returned" hold.
pub(super) struct TopicEntry {
    /// Set when the session ended and subscribers were evicted
    pub closed: bool,

    /// Current subscribers, keyed by subscription ID
    pub subscribers: HashMap<SubscriptionId, Subscriber>,

    /// When the topic was created
    pub created_at: Instant,
}

impl TopicEntry {
    /// Create a new open topic entry
    pub(super) fn new() -> Self {
        Self {
            closed: false,
            subscribers: HashMap::new(),
            created_at: Instant::now(),
        }
    }

    /// Get the number of subscribers
    pub(super) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Statistics for a topic
#[derive(Debug, Clone)]
pub struct TopicStats {
    /// Number of current subscribers
    pub subscriber_count: usize,
    /// Whether the topic has been closed by session end
    pub closed: bool,
    /// Age of the topic
    pub age: std::time::Duration,
}
