//! Participant channel seam
//!
//! The transport layer owns each participant's connection; the relay only
//! holds a non-owning delivery handle. This trait is that handle. The
//! built-in implementation for `mpsc::UnboundedSender` covers the common
//! case of a per-connection writer task draining a receiver.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::event::TopicEvent;

/// Delivery endpoint for one participant's connection
///
/// Implementations must not block: `send` is called while topic state is
/// locked, so it has to hand the event off (queue it, wake a writer task)
/// and return.
pub trait ParticipantChannel: Send + Sync {
    /// Deliver one event. Returns `false` if the receiving side is gone,
    /// which tells the relay to drop this subscriber.
    fn send(&self, event: TopicEvent) -> bool;

    /// Whether the receiving side has been dropped
    fn is_closed(&self) -> bool;
}

impl ParticipantChannel for mpsc::UnboundedSender<TopicEvent> {
    fn send(&self, event: TopicEvent) -> bool {
        mpsc::UnboundedSender::send(self, event).is_ok()
    }

    fn is_closed(&self) -> bool {
        mpsc::UnboundedSender::is_closed(self)
    }
}

/// Create a connected channel/receiver pair
///
/// The channel half goes to [`crate::relay::TopicRelay::subscribe`]; the
/// receiver half stays with the transport's writer loop.
pub fn participant_channel() -> (
    Arc<dyn ParticipantChannel>,
    mpsc::UnboundedReceiver<TopicEvent>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(tx), rx)
}
