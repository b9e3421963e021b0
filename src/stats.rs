//! Registry and relay statistics

/// Registry-wide statistics
#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    /// Total sessions ever created (active and ended)
    pub total_sessions: usize,
    /// Sessions currently active
    pub active_sessions: usize,
}

/// Relay-wide statistics
#[derive(Debug, Clone, Default)]
pub struct RelayStats {
    /// Total topics (open and closed)
    pub topics: usize,
    /// Topics still open
    pub open_topics: usize,
    /// Subscribers across all topics
    pub subscribers: usize,
}
