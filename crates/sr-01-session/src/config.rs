//! # Session Configuration
//!
//! Configuration for the Session Manager.

use serde::{Deserialize, Serialize};

use crate::domain::{
    DEFAULT_CHALLENGE_TTL_SECS, DEFAULT_COUNTRY_CODE, DEFAULT_MAX_CONTACTS,
    DEFAULT_RESEND_COOLDOWN_SECS,
};

/// Session manager configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Prefix applied when normalizing a local mobile number.
    pub country_code: String,

    /// Minimum wait between two verification codes for the same session.
    pub resend_cooldown_secs: u64,

    /// Lifetime of a verification challenge.
    pub challenge_ttl_secs: u64,

    /// Maximum number of emergency contacts on one profile.
    pub max_contacts: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            resend_cooldown_secs: DEFAULT_RESEND_COOLDOWN_SECS,
            challenge_ttl_secs: DEFAULT_CHALLENGE_TTL_SECS,
            max_contacts: DEFAULT_MAX_CONTACTS,
        }
    }
}

impl SessionConfig {
    /// Create a config for testing (short challenge lifetime).
    pub fn for_testing() -> Self {
        Self {
            challenge_ttl_secs: 120,
            max_contacts: 2,
            ..Self::default()
        }
    }

    /// Challenge lifetime in milliseconds.
    pub fn challenge_ttl_ms(&self) -> u64 {
        self.challenge_ttl_secs.saturating_mul(1_000)
    }
}
