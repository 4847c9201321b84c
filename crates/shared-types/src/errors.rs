//! # Error Types
//!
//! Defines the error shape every backend adapter reports.

use thiserror::Error;

/// Failure reported by an external collaborator (authentication, dispatch,
/// profile persistence, safety alerting).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Backend could not be reached or failed internally.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Backend understood the request and refused it.
    #[error("Rejected by backend: {0}")]
    Rejected(String),

    /// Backend throttled the request.
    #[error("Backend rate limit: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds the backend asked us to wait.
        retry_after_secs: u64,
    },

    /// Backend considers the phone number invalid.
    #[error("Backend rejected phone number")]
    InvalidNumber,

    /// Backend rejected the verification code.
    #[error("Backend rejected verification code")]
    InvalidCode,

    /// Backend says the challenge has expired.
    #[error("Backend reports challenge expired")]
    Expired,
}

impl GatewayError {
    /// Whether this is a transport/availability failure rather than a refusal.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
