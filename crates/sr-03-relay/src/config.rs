//! # Relay Configuration

use serde::{Deserialize, Serialize};

/// Default number of chat messages kept per ride.
pub const DEFAULT_MAX_MESSAGES_PER_RIDE: usize = 500;

/// Default number of notifications kept.
pub const DEFAULT_MAX_NOTIFICATIONS: usize = 200;

/// Chat and notification relay configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Chat messages kept per ride; oldest are dropped first. 0 keeps all.
    pub max_messages_per_ride: usize,

    /// Notifications kept; oldest are dropped first. 0 keeps all.
    pub max_notifications: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_messages_per_ride: DEFAULT_MAX_MESSAGES_PER_RIDE,
            max_notifications: DEFAULT_MAX_NOTIFICATIONS,
        }
    }
}

impl RelayConfig {
    /// Create a config for testing (tiny buffers).
    pub fn for_testing() -> Self {
        Self {
            max_messages_per_ride: 4,
            max_notifications: 4,
        }
    }
}
