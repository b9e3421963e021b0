//! Topic relay implementation
//!
//! The central relay that manages per-session topics and fans signaling
//! payloads out to the subscribers of each topic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{Mutex, RwLock};

use crate::registry::{SessionId, SessionRegistry};
use crate::stats::RelayStats;

use super::channel::ParticipantChannel;
use super::config::RelayConfig;
use super::error::RelayError;
use super::event::{SignalingMessage, TopicEvent};
use super::topic::{Subscriber, Subscription, SubscriptionId, TopicEntry, TopicStats};

/// Central relay for all topics
///
/// Thread-safe via `RwLock`. The outer map lock is held only for lookup and
/// insert; each topic mutates under its own entry lock, so subscribe and
/// publish on different sessions never contend.
///
/// The relay holds an explicit reference to the [`SessionRegistry`] so that
/// subscribe and publish can validate session state themselves: callers get
/// `SessionNotFound`/`SessionEnded` back as values, and a topic is never
/// created for a session that does not exist.
pub struct TopicRelay {
    /// Map of session ID to topic entry
    topics: RwLock<HashMap<SessionId, Arc<Mutex<TopicEntry>>>>,

    /// Session registry used to validate session state
    registry: Arc<SessionRegistry>,

    /// Next subscription ID to allocate
    next_subscription_id: AtomicU64,

    /// Configuration
    config: RelayConfig,
}

impl TopicRelay {
    /// Create a new topic relay with default configuration
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self::with_config(registry, RelayConfig::default())
    }

    /// Create a new topic relay with custom configuration
    pub fn with_config(registry: Arc<SessionRegistry>, config: RelayConfig) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            registry,
            next_subscription_id: AtomicU64::new(1),
            config,
        }
    }

    /// Get the relay configuration
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Look up an existing topic entry without creating one
    async fn lookup(&self, session_id: SessionId) -> Option<Arc<Mutex<TopicEntry>>> {
        self.topics.read().await.get(&session_id).cloned()
    }

    /// Get or lazily create the topic entry for a session
    async fn topic_entry(&self, session_id: SessionId) -> Arc<Mutex<TopicEntry>> {
        if let Some(entry) = self.lookup(session_id).await {
            return entry;
        }

        let mut topics = self.topics.write().await;
        Arc::clone(
            topics
                .entry(session_id)
                .or_insert_with(|| Arc::new(Mutex::new(TopicEntry::new()))),
        )
    }

    /// Subscribe a participant's channel to a session topic
    ///
    /// The channel is a non-owning handle supplied by the transport layer;
    /// the relay drops it on unsubscribe or eviction. One identity may
    /// subscribe any number of times, each call yielding an independent
    /// subscription.
    ///
    /// A subscribe racing with `end` either lands before eviction (and is
    /// then evicted with a `SessionEnded` event, before `end` returns) or
    /// observes the closed topic and fails. Once `end` has returned, no
    /// subscribe on that session can succeed.
    pub async fn subscribe(
        &self,
        session_id: SessionId,
        identity: &str,
        channel: Arc<dyn ParticipantChannel>,
    ) -> Result<Subscription, RelayError> {
        match self.registry.get(session_id).await {
            Ok(session) if session.is_active() => {}
            Ok(_) => return Err(RelayError::SessionEnded(session_id)),
            Err(_) => return Err(RelayError::SessionNotFound(session_id)),
        }

        let entry_arc = self.topic_entry(session_id).await;
        let mut entry = entry_arc.lock().await;

        // The session may have ended between the registry check and taking
        // the topic lock; the tombstone catches that.
        if entry.closed {
            return Err(RelayError::SessionEnded(session_id));
        }

        if self.config.max_subscribers > 0 && entry.subscriber_count() >= self.config.max_subscribers
        {
            return Err(RelayError::TopicFull(session_id));
        }

        let id = SubscriptionId(self.next_subscription_id.fetch_add(1, Ordering::Relaxed));
        entry.subscribers.insert(
            id,
            Subscriber {
                identity: identity.to_string(),
                channel,
            },
        );

        tracing::info!(
            session = %session_id,
            identity = %identity,
            subscription = %id,
            subscribers = entry.subscriber_count(),
            "Subscriber added"
        );

        Ok(Subscription { id, session_id })
    }

    /// Unsubscribe a subscription from its topic
    ///
    /// Idempotent: unsubscribing a handle that was already removed (by a
    /// second call, by eviction, or by the sweep) is a no-op.
    pub async fn unsubscribe(&self, subscription: &Subscription) {
        if let Some(entry_arc) = self.lookup(subscription.session_id).await {
            let mut entry = entry_arc.lock().await;

            if entry.subscribers.remove(&subscription.id).is_some() {
                tracing::debug!(
                    session = %subscription.session_id,
                    subscription = %subscription.id,
                    subscribers = entry.subscriber_count(),
                    "Subscriber removed"
                );
            }
        }
    }

    /// Publish a signaling payload to every subscriber of a topic
    ///
    /// The payload is forwarded unmodified; the sender's own subscriptions
    /// are not excluded. Delivery happens under the topic lock, so each
    /// publish is one consistent snapshot: a subscriber joining or leaving
    /// concurrently either receives the message or cleanly does not, and
    /// per-sender ordering is preserved into every subscriber's channel.
    ///
    /// Returns the number of subscribers the message was delivered to.
    /// Subscribers whose channel turns out closed are dropped on the spot.
    pub async fn publish(
        &self,
        session_id: SessionId,
        sender: &str,
        payload: Bytes,
    ) -> Result<usize, RelayError> {
        let entry_arc = match self.lookup(session_id).await {
            Some(entry) => entry,
            None => {
                // No topic yet: nobody subscribed. Still distinguish a
                // quiet session from an unknown or ended one.
                return match self.registry.get(session_id).await {
                    Ok(session) if session.is_active() => Ok(0),
                    Ok(_) => Err(RelayError::SessionEnded(session_id)),
                    Err(_) => Err(RelayError::SessionNotFound(session_id)),
                };
            }
        };

        let mut entry = entry_arc.lock().await;

        if entry.closed {
            return Err(RelayError::SessionEnded(session_id));
        }

        let message = SignalingMessage::new(session_id, sender, payload);

        let mut delivered = 0;
        let mut dead = Vec::new();
        for (id, subscriber) in entry.subscribers.iter() {
            if subscriber.channel.send(TopicEvent::Signal(message.clone())) {
                delivered += 1;
            } else {
                dead.push(*id);
            }
        }

        for id in dead {
            entry.subscribers.remove(&id);
            tracing::debug!(
                session = %session_id,
                subscription = %id,
                "Dropped subscriber with closed channel"
            );
        }

        tracing::trace!(
            session = %session_id,
            sender = %sender,
            delivered = delivered,
            "Signal relayed"
        );

        Ok(delivered)
    }

    /// Evict every subscriber of a topic when its session ends
    ///
    /// Each subscriber receives a terminal `SessionEnded` event before its
    /// handle is dropped, so clients can tear down peer connections cleanly
    /// instead of discovering a dead channel. The topic is left closed as a
    /// tombstone; a second eviction is a no-op.
    ///
    /// Returns the number of subscribers evicted.
    pub async fn force_evict(&self, session_id: SessionId) -> usize {
        // Create the tombstone even if nobody ever subscribed, so a racing
        // subscribe cannot open a fresh topic for the ended session.
        let entry_arc = self.topic_entry(session_id).await;
        let mut entry = entry_arc.lock().await;

        if entry.closed {
            return 0;
        }
        entry.closed = true;

        let evicted = entry.subscriber_count();
        for (_, subscriber) in entry.subscribers.drain() {
            let _ = subscriber
                .channel
                .send(TopicEvent::SessionEnded { session_id });
        }

        tracing::info!(
            session = %session_id,
            evicted = evicted,
            "Topic closed, subscribers evicted"
        );

        evicted
    }

    /// Run the sweep once
    ///
    /// Removes subscribers whose channels closed without an explicit
    /// unsubscribe (a transport that died mid-connection). Returns the
    /// number pruned.
    pub async fn sweep(&self) -> usize {
        let entries: Vec<Arc<Mutex<TopicEntry>>> =
            self.topics.read().await.values().cloned().collect();

        let mut pruned = 0;
        for entry_arc in entries {
            // Skip topics that are busy right now; the next sweep gets them
            if let Ok(mut entry) = entry_arc.try_lock() {
                let before = entry.subscriber_count();
                entry
                    .subscribers
                    .retain(|_, subscriber| !subscriber.channel.is_closed());
                pruned += before - entry.subscriber_count();
            }
        }

        if pruned > 0 {
            tracing::debug!(pruned = pruned, "Swept subscribers with closed channels");
        }

        pruned
    }

    /// Spawn background sweep task
    ///
    /// Returns a handle that can be used to abort the task.
    pub fn spawn_sweep_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let relay = Arc::clone(self);
        let interval = relay.config.sweep_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                relay.sweep().await;
            }
        })
    }

    /// Get statistics for one topic
    pub async fn topic_stats(&self, session_id: SessionId) -> Option<TopicStats> {
        let entry_arc = self.lookup(session_id).await?;
        let entry = entry_arc.lock().await;

        Some(TopicStats {
            subscriber_count: entry.subscriber_count(),
            closed: entry.closed,
            age: entry.created_at.elapsed(),
        })
    }

    /// Get total number of topics (open and closed)
    pub async fn topic_count(&self) -> usize {
        self.topics.read().await.len()
    }

    /// Get relay-wide statistics
    pub async fn stats(&self) -> RelayStats {
        let entries: Vec<Arc<Mutex<TopicEntry>>> =
            self.topics.read().await.values().cloned().collect();

        let mut open = 0;
        let mut subscribers = 0;
        for entry_arc in entries.iter() {
            let entry = entry_arc.lock().await;
            if !entry.closed {
                open += 1;
            }
            subscribers += entry.subscriber_count();
        }

        RelayStats {
            topics: entries.len(),
            open_topics: open,
            subscribers,
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use crate::registry::Session;
    use crate::relay::channel::participant_channel;

    use super::*;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }

    async fn setup() -> (Arc<SessionRegistry>, TopicRelay, Session) {
        init_tracing();
        let registry = Arc::new(SessionRegistry::new());
        let session = registry
            .create("Algebra I", "teacher@example.com")
            .await
            .unwrap();
        let relay = TopicRelay::new(Arc::clone(&registry));
        (registry, relay, session)
    }

    fn payload(s: &str) -> Bytes {
        Bytes::copy_from_slice(s.as_bytes())
    }

    async fn expect_signal(
        rx: &mut tokio::sync::mpsc::UnboundedReceiver<TopicEvent>,
    ) -> SignalingMessage {
        match rx.recv().await {
            Some(TopicEvent::Signal(msg)) => msg,
            other => panic!("expected signal, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_subscribe_unknown_session() {
        let (_registry, relay, _session) = setup().await;
        let (tx, _rx) = participant_channel();

        let result = relay.subscribe(SessionId(999), "a@example.com", tx).await;
        assert_eq!(result, Err(RelayError::SessionNotFound(SessionId(999))));

        // No topic shell gets created for an unknown session
        assert_eq!(relay.topic_count().await, 0);
    }

    #[tokio::test]
    async fn test_publish_delivers_to_subscriber() {
        let (_registry, relay, session) = setup().await;
        let (tx, mut rx) = participant_channel();

        relay
            .subscribe(session.id, "b@example.com", tx)
            .await
            .unwrap();

        let delivered = relay
            .publish(session.id, "teacher@example.com", payload("{\"type\":\"offer\"}"))
            .await
            .unwrap();
        assert_eq!(delivered, 1);

        let msg = expect_signal(&mut rx).await;
        assert_eq!(msg.session_id, session.id);
        assert_eq!(msg.sender, "teacher@example.com");
        assert_eq!(msg.payload, payload("{\"type\":\"offer\"}"));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let (_registry, relay, session) = setup().await;

        let delivered = relay
            .publish(session.id, "teacher@example.com", payload("x"))
            .await
            .unwrap();
        assert_eq!(delivered, 0);

        let result = relay
            .publish(SessionId(999), "teacher@example.com", payload("x"))
            .await;
        assert_eq!(result, Err(RelayError::SessionNotFound(SessionId(999))));
    }

    #[tokio::test]
    async fn test_sender_not_excluded() {
        let (_registry, relay, session) = setup().await;
        let (tx, mut rx) = participant_channel();

        relay
            .subscribe(session.id, "a@example.com", tx)
            .await
            .unwrap();

        // The sender's own subscription receives the message too
        let delivered = relay
            .publish(session.id, "a@example.com", payload("candidate"))
            .await
            .unwrap();
        assert_eq!(delivered, 1);

        let msg = expect_signal(&mut rx).await;
        assert_eq!(msg.sender, "a@example.com");
    }

    #[tokio::test]
    async fn test_per_sender_ordering() {
        let (_registry, relay, session) = setup().await;
        let (tx, mut rx) = participant_channel();

        relay
            .subscribe(session.id, "b@example.com", tx)
            .await
            .unwrap();

        relay
            .publish(session.id, "a@example.com", payload("m1"))
            .await
            .unwrap();
        relay
            .publish(session.id, "a@example.com", payload("m2"))
            .await
            .unwrap();

        assert_eq!(expect_signal(&mut rx).await.payload, payload("m1"));
        assert_eq!(expect_signal(&mut rx).await.payload, payload("m2"));
    }

    #[tokio::test]
    async fn test_multiple_subscriptions_same_identity() {
        let (_registry, relay, session) = setup().await;
        let (tx1, mut rx1) = participant_channel();
        let (tx2, mut rx2) = participant_channel();

        // Same identity on two devices: independent subscriptions
        let sub1 = relay
            .subscribe(session.id, "b@example.com", tx1)
            .await
            .unwrap();
        let sub2 = relay
            .subscribe(session.id, "b@example.com", tx2)
            .await
            .unwrap();
        assert_ne!(sub1.id, sub2.id);

        let delivered = relay
            .publish(session.id, "a@example.com", payload("x"))
            .await
            .unwrap();
        assert_eq!(delivered, 2);

        expect_signal(&mut rx1).await;
        expect_signal(&mut rx2).await;
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent() {
        let (_registry, relay, session) = setup().await;
        let (tx, _rx) = participant_channel();

        let sub = relay
            .subscribe(session.id, "b@example.com", tx)
            .await
            .unwrap();

        relay.unsubscribe(&sub).await;
        relay.unsubscribe(&sub).await; // No-op

        let stats = relay.topic_stats(session.id).await.unwrap();
        assert_eq!(stats.subscriber_count, 0);

        // Unsubscribed channel no longer receives publishes
        let delivered = relay
            .publish(session.id, "a@example.com", payload("x"))
            .await
            .unwrap();
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_force_evict_sends_terminal_event() {
        let (registry, relay, session) = setup().await;
        let (tx, mut rx) = participant_channel();

        relay
            .subscribe(session.id, "b@example.com", tx)
            .await
            .unwrap();

        registry.end(session.id, "teacher@example.com").await.unwrap();
        let evicted = relay.force_evict(session.id).await;
        assert_eq!(evicted, 1);

        // Terminal event first, then the stream closes
        match rx.recv().await {
            Some(TopicEvent::SessionEnded { session_id }) => assert_eq!(session_id, session.id),
            other => panic!("expected SessionEnded, got {:?}", other),
        }
        assert!(rx.recv().await.is_none());

        // Second eviction does nothing
        assert_eq!(relay.force_evict(session.id).await, 0);
    }

    #[tokio::test]
    async fn test_subscribe_after_end() {
        let (registry, relay, session) = setup().await;

        registry.end(session.id, "teacher@example.com").await.unwrap();
        relay.force_evict(session.id).await;

        let (tx, _rx) = participant_channel();
        let result = relay.subscribe(session.id, "c@example.com", tx).await;
        assert_eq!(result, Err(RelayError::SessionEnded(session.id)));

        let result = relay
            .publish(session.id, "teacher@example.com", payload("x"))
            .await;
        assert_eq!(result, Err(RelayError::SessionEnded(session.id)));
    }

    #[tokio::test]
    async fn test_evict_without_subscribers_blocks_later_subscribe() {
        let (registry, relay, session) = setup().await;

        // End before anyone ever joined: the tombstone must still exist
        registry.end(session.id, "teacher@example.com").await.unwrap();
        assert_eq!(relay.force_evict(session.id).await, 0);

        let (tx, _rx) = participant_channel();
        let result = relay.subscribe(session.id, "c@example.com", tx).await;
        assert_eq!(result, Err(RelayError::SessionEnded(session.id)));
    }

    #[tokio::test]
    async fn test_concurrent_subscribes_both_receive() {
        let (_registry, relay, session) = setup().await;
        let relay = Arc::new(relay);

        let (tx1, mut rx1) = participant_channel();
        let (tx2, mut rx2) = participant_channel();

        let (r1, r2) = tokio::join!(
            relay.subscribe(session.id, "b@example.com", tx1),
            relay.subscribe(session.id, "c@example.com", tx2),
        );
        r1.unwrap();
        r2.unwrap();

        let delivered = relay
            .publish(session.id, "a@example.com", payload("x"))
            .await
            .unwrap();
        assert_eq!(delivered, 2);

        // Exactly once each
        expect_signal(&mut rx1).await;
        expect_signal(&mut rx2).await;
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_prunes_dead_channels() {
        let (_registry, relay, session) = setup().await;
        let (tx1, rx1) = participant_channel();
        let (tx2, mut rx2) = participant_channel();

        relay
            .subscribe(session.id, "b@example.com", tx1)
            .await
            .unwrap();
        relay
            .subscribe(session.id, "c@example.com", tx2)
            .await
            .unwrap();

        // b's transport died without unsubscribing
        drop(rx1);

        let delivered = relay
            .publish(session.id, "a@example.com", payload("x"))
            .await
            .unwrap();
        assert_eq!(delivered, 1);
        expect_signal(&mut rx2).await;

        let stats = relay.topic_stats(session.id).await.unwrap();
        assert_eq!(stats.subscriber_count, 1);
    }

    #[tokio::test]
    async fn test_sweep_prunes_closed_channels() {
        let (_registry, relay, session) = setup().await;
        let (tx, rx) = participant_channel();

        relay
            .subscribe(session.id, "b@example.com", tx)
            .await
            .unwrap();
        drop(rx);

        assert_eq!(relay.sweep().await, 1);
        assert_eq!(relay.sweep().await, 0);

        let stats = relay.topic_stats(session.id).await.unwrap();
        assert_eq!(stats.subscriber_count, 0);
    }

    #[tokio::test]
    async fn test_max_subscribers() {
        let registry = Arc::new(SessionRegistry::new());
        let session = registry
            .create("Algebra I", "teacher@example.com")
            .await
            .unwrap();
        let relay =
            TopicRelay::with_config(Arc::clone(&registry), RelayConfig::default().max_subscribers(1));

        let (tx1, _rx1) = participant_channel();
        let (tx2, _rx2) = participant_channel();

        relay
            .subscribe(session.id, "b@example.com", tx1)
            .await
            .unwrap();
        let result = relay.subscribe(session.id, "c@example.com", tx2).await;
        assert_eq!(result, Err(RelayError::TopicFull(session.id)));
    }

    #[tokio::test]
    async fn test_relay_stats() {
        let (registry, relay, session) = setup().await;
        let other = registry
            .create("Biology", "teacher@example.com")
            .await
            .unwrap();

        let (tx1, _rx1) = participant_channel();
        let (tx2, _rx2) = participant_channel();
        relay
            .subscribe(session.id, "b@example.com", tx1)
            .await
            .unwrap();
        relay
            .subscribe(other.id, "c@example.com", tx2)
            .await
            .unwrap();

        registry.end(other.id, "teacher@example.com").await.unwrap();
        relay.force_evict(other.id).await;

        let stats = relay.stats().await;
        assert_eq!(stats.topics, 2);
        assert_eq!(stats.open_topics, 1);
        assert_eq!(stats.subscribers, 1);
    }
}
