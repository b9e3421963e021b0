//! Session registry and signaling relay for live classroom peer connections.
//!
//! A teacher opens a session; students join its topic; everyone exchanges
//! opaque signaling payloads (SDP offers/answers, ICE candidates) through
//! the relay to establish direct media channels. Media itself never passes
//! through here — only the signaling needed to set it up.
//!
//! Three components, composed explicitly:
//!
//! - [`registry::SessionRegistry`] — session lifecycle: create, look up,
//!   list active, end (owner only, one-way).
//! - [`relay::TopicRelay`] — per-session pub/sub fan-out of opaque payloads,
//!   with forced eviction when a session ends.
//! - [`gateway::SessionGateway`] — stateless front door that validates
//!   session state before letting the relay see a join or a publish.
//!
//! The transport layer (WebSocket, in-process, whatever) stays outside: it
//! supplies each participant's [`relay::ParticipantChannel`] delivery handle
//! and calls [`gateway::SessionGateway::leave`] when a connection closes.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use bytes::Bytes;
//! use signaling_rs::relay::participant_channel;
//! use signaling_rs::{SessionGateway, SessionRegistry, TopicRelay};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> signaling_rs::Result<()> {
//! let registry = Arc::new(SessionRegistry::new());
//! let relay = Arc::new(TopicRelay::new(Arc::clone(&registry)));
//! let gateway = SessionGateway::new(registry, relay);
//!
//! let session = gateway
//!     .create_session("Algebra I", "teacher@example.com")
//!     .await?;
//!
//! // The transport supplies the delivery channel for each participant
//! let (channel, mut events) = participant_channel();
//! let subscription = gateway
//!     .join(session.id, "student@example.com", channel)
//!     .await?;
//!
//! gateway
//!     .relay_message(
//!         session.id,
//!         "teacher@example.com",
//!         Bytes::from_static(b"{\"type\":\"offer\"}"),
//!     )
//!     .await?;
//!
//! let event = events.recv().await;
//! gateway.leave(&subscription).await;
//! # let _ = event;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod gateway;
pub mod registry;
pub mod relay;
pub mod stats;

pub use error::{Error, Result};
pub use gateway::{IdentityDirectory, PassthroughDirectory, SessionGateway, SessionView};
pub use registry::{
    RegistryConfig, RegistryError, Session, SessionId, SessionRegistry, SessionState,
};
pub use relay::{
    ParticipantChannel, RelayConfig, RelayError, SignalingMessage, Subscription, SubscriptionId,
    TopicEvent, TopicRelay, TopicStats,
};
pub use stats::{RegistryStats, RelayStats};
