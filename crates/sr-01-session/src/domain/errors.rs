//! # Domain Errors
//!
//! Error types for the Session Manager.

use shared_types::GatewayError;
use thiserror::Error;

/// Session manager error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Phone number is not a 10-digit mobile number starting with 6-9.
    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    /// Verification code is not exactly six ASCII digits.
    #[error("Verification code must be exactly 6 digits")]
    InvalidCodeFormat,

    /// A code was requested again before the cooldown elapsed.
    #[error("Please wait {retry_after_secs}s before requesting another code")]
    RateLimited {
        /// Whole seconds until a new code may be requested.
        retry_after_secs: u64,
    },

    /// The backend refused the code.
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// The challenge outlived its lifetime.
    #[error("Verification code expired, request a new one")]
    ChallengeExpired,

    /// The token does not match the pending challenge (or none is pending).
    #[error("No matching verification in progress")]
    UnknownChallenge,

    /// Operation requires a signed-in passenger.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// A challenge cannot be requested while signed in.
    #[error("Already authenticated")]
    AlreadyAuthenticated,

    /// Another session operation is still running.
    #[error("Another session operation is in progress")]
    OperationInProgress,

    /// Emergency contact failed validation.
    #[error("Invalid emergency contact: {0}")]
    InvalidContact(String),

    /// Profile patch failed validation.
    #[error("Invalid profile update: {0}")]
    InvalidProfile(String),

    /// Backend failure (network, internal error, persistence).
    #[error("Service unavailable: {0}")]
    CollaboratorUnavailable(String),
}

/// Result alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

impl SessionError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidPhoneNumber(_) => "invalid_phone_number",
            Self::InvalidCodeFormat => "invalid_code_format",
            Self::RateLimited { .. } => "rate_limited",
            Self::VerificationFailed(_) => "verification_failed",
            Self::ChallengeExpired => "challenge_expired",
            Self::UnknownChallenge => "unknown_challenge",
            Self::NotAuthenticated => "not_authenticated",
            Self::AlreadyAuthenticated => "already_authenticated",
            Self::OperationInProgress => "operation_in_progress",
            Self::InvalidContact(_) => "invalid_contact",
            Self::InvalidProfile(_) => "invalid_profile",
            Self::CollaboratorUnavailable(_) => "collaborator_unavailable",
        }
    }

    /// Map a failure from `send_challenge`.
    pub(crate) fn from_send(err: GatewayError, phone: &str) -> Self {
        match err {
            GatewayError::RateLimited { retry_after_secs } => Self::RateLimited { retry_after_secs },
            GatewayError::InvalidNumber => Self::InvalidPhoneNumber(phone.to_string()),
            other => Self::CollaboratorUnavailable(other.to_string()),
        }
    }

    /// Map a failure from `verify_challenge`.
    pub(crate) fn from_verify(err: GatewayError) -> Self {
        match err {
            GatewayError::InvalidCode => Self::VerificationFailed("code rejected".to_string()),
            GatewayError::Rejected(reason) => Self::VerificationFailed(reason),
            GatewayError::Expired => Self::ChallengeExpired,
            other => Self::CollaboratorUnavailable(other.to_string()),
        }
    }
}

impl From<GatewayError> for SessionError {
    fn from(err: GatewayError) -> Self {
        Self::CollaboratorUnavailable(err.to_string())
    }
}
