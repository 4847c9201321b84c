//! # Domain Errors

use thiserror::Error;

use super::entities::NotificationId;

/// Errors returned by the chat and notification relays.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Message body is blank.
    #[error("Message body is empty")]
    EmptyMessage,

    /// No notification with this id is held.
    #[error("Unknown notification: {0}")]
    UnknownNotification(NotificationId),
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

impl RelayError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyMessage => "empty_message",
            Self::UnknownNotification(_) => "unknown_notification",
        }
    }
}
