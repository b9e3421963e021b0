//! Topic relay for per-session signaling fan-out
//!
//! The relay manages one topic per session and broadcasts opaque signaling
//! payloads to every current subscriber of that topic.
//!
//! # Architecture
//!
//! ```text
//!                           Arc<TopicRelay>
//!                      ┌─────────────────────────┐
//!                      │ topics: HashMap<        │
//!                      │   SessionId,            │
//!                      │   TopicEntry {          │
//!                      │     closed,             │
//!                      │     subscribers,        │
//!                      │   }                     │
//!                      │ >                       │
//!                      └───────────┬─────────────┘
//!                                  │
//!          ┌───────────────────────┼───────────────────────┐
//!          │                       │                       │
//!          ▼                       ▼                       ▼
//!     [Publisher]            [Subscriber]            [Subscriber]
//!     publish()              events.recv()           events.recv()
//!          │                       │                       │
//!          └──► relay.publish() ──► channel.send() ──► transport
//! ```
//!
//! # Zero-Copy Design
//!
//! Payloads are `bytes::Bytes`, which is reference counted: fan-out clones
//! the `SignalingMessage` envelope per subscriber, but the payload bytes are
//! shared, not copied. The relay never reads the payload — its shape is a
//! contract between clients.

pub mod channel;
pub mod config;
pub mod error;
pub mod event;
pub mod store;
pub mod topic;

pub use channel::{participant_channel, ParticipantChannel};
pub use config::RelayConfig;
pub use error::RelayError;
pub use event::{SignalingMessage, TopicEvent};
pub use store::TopicRelay;
pub use topic::{Subscription, SubscriptionId, TopicStats};
