//! Relay configuration

use std::time::Duration;

/// Configuration for the topic relay
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Maximum subscribers per topic (0 = unlimited)
    pub max_subscribers: usize,

    /// How often the sweep task prunes subscribers whose channels closed
    /// without an explicit unsubscribe
    pub sweep_interval: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_subscribers: 0, // Unlimited
            sweep_interval: Duration::from_secs(30),
        }
    }
}

impl RelayConfig {
    /// Set the per-topic subscriber limit
    pub fn max_subscribers(mut self, max: usize) -> Self {
        self.max_subscribers = max;
        self
    }

    /// Set the sweep interval
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}
