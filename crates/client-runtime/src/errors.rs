//! # Client Errors
//!
//! One error type for callers of [`SafeRideClient`](crate::SafeRideClient),
//! plus a flat [`ErrorKind`] for callers that only care about the category.

use saferide_telemetry::TelemetryError;
use sr_01_session::SessionError;
use sr_02_ride_tracking::RideError;
use sr_03_relay::RelayError;
use thiserror::Error;

use crate::container::ConfigError;

/// Errors surfaced by the client facade.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Session Manager failure.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Ride State Tracker failure.
    #[error(transparent)]
    Ride(#[from] RideError),

    /// Relay failure.
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// Bad configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging or metrics could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

/// Error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidPhoneNumber,
    InvalidCodeFormat,
    RateLimited,
    VerificationFailed,
    ChallengeExpired,
    NotAuthenticated,
    MissingLocation,
    BookingFailed,
    InvalidTransition,
    /// Another call is in flight, or the requested state already exists.
    Conflict,
    /// Input rejected by validation.
    InvalidInput,
    /// Referenced ride, booking, challenge or notification does not exist.
    NotFound,
    CollaboratorUnavailable,
    Configuration,
}

impl ClientError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Session(e) => match e {
                SessionError::InvalidPhoneNumber(_) => ErrorKind::InvalidPhoneNumber,
                SessionError::InvalidCodeFormat => ErrorKind::InvalidCodeFormat,
                SessionError::RateLimited { .. } => ErrorKind::RateLimited,
                SessionError::VerificationFailed(_) => ErrorKind::VerificationFailed,
                SessionError::ChallengeExpired => ErrorKind::ChallengeExpired,
                SessionError::UnknownChallenge => ErrorKind::NotFound,
                SessionError::NotAuthenticated => ErrorKind::NotAuthenticated,
                SessionError::AlreadyAuthenticated | SessionError::OperationInProgress => {
                    ErrorKind::Conflict
                }
                SessionError::InvalidContact(_) | SessionError::InvalidProfile(_) => {
                    ErrorKind::InvalidInput
                }
                SessionError::CollaboratorUnavailable(_) => ErrorKind::CollaboratorUnavailable,
            },
            Self::Ride(e) => match e {
                RideError::NotAuthenticated => ErrorKind::NotAuthenticated,
                RideError::MissingLocation(_) => ErrorKind::MissingLocation,
                RideError::BookingFailed(_) | RideError::InvalidFare { .. } => {
                    ErrorKind::BookingFailed
                }
                RideError::InvalidTransition { .. }
                | RideError::InvalidPaymentTransition { .. } => ErrorKind::InvalidTransition,
                RideError::RideAlreadyActive | RideError::OperationInProgress => {
                    ErrorKind::Conflict
                }
                RideError::NoActiveRide
                | RideError::NoPendingBooking
                | RideError::UnknownDriver(_) => ErrorKind::NotFound,
                RideError::InvalidRating(_) | RideError::DriverMismatch { .. } => {
                    ErrorKind::InvalidInput
                }
                RideError::CollaboratorUnavailable(_) => ErrorKind::CollaboratorUnavailable,
            },
            Self::Relay(e) => match e {
                RelayError::EmptyMessage => ErrorKind::InvalidInput,
                RelayError::UnknownNotification(_) => ErrorKind::NotFound,
            },
            Self::Config(_) | Self::Telemetry(_) => ErrorKind::Configuration,
        }
    }

    /// Subsystem label and error label for the error counter.
    pub(crate) fn metric_labels(&self) -> (&'static str, &'static str) {
        match self {
            Self::Session(e) => ("session", e.kind()),
            Self::Ride(e) => ("ride-tracking", e.kind()),
            Self::Relay(e) => ("relay", e.kind()),
            Self::Config(_) => ("runtime", "config"),
            Self::Telemetry(_) => ("runtime", "telemetry"),
        }
    }
}

/// Result type for facade operations.
pub type ClientResult<T> = Result<T, ClientError>;
