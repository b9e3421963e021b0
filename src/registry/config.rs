//! Registry configuration

/// Configuration for the session registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum accepted title length in bytes
    pub max_title_len: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { max_title_len: 256 }
    }
}

impl RegistryConfig {
    /// Set the maximum title length
    pub fn max_title_len(mut self, len: usize) -> Self {
        self.max_title_len = len;
        self
    }
}
