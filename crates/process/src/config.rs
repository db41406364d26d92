//! Engine configuration

use std::env;

/// Configuration for the process executor
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum step transitions per instance before it is routed to the
    /// error terminal
    pub max_transitions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_transitions: 10_000,
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `WAYPOINT_MAX_TRANSITIONS`: transition limit per instance (default: 10000)
    pub fn from_env() -> Self {
        let max_transitions = env::var("WAYPOINT_MAX_TRANSITIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(10_000);

        Self { max_transitions }
    }

    /// Set the transition limit
    pub fn with_max_transitions(mut self, max_transitions: usize) -> Self {
        self.max_transitions = max_transitions;
        self
    }
}
