//! # Domain Errors
//!
//! Error types for the Ride State Tracker.

use shared_types::{DriverId, GatewayError};
use thiserror::Error;

use super::value_objects::{PaymentStatus, RideStatus};

/// Ride tracker error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RideError {
    /// Operation requires a signed-in passenger.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Pickup or drop address is blank.
    #[error("Missing {0} location")]
    MissingLocation(&'static str),

    /// Dispatch refused the booking or returned an unusable ride.
    #[error("Booking failed: {0}")]
    BookingFailed(String),

    /// Status change is not the immediate successor.
    #[error("Invalid ride transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: RideStatus,
        /// Requested status.
        to: RideStatus,
    },

    /// A ride is already in progress.
    #[error("A ride is already in progress")]
    RideAlreadyActive,

    /// There is no current ride.
    #[error("No active ride")]
    NoActiveRide,

    /// `confirm_ride` without a prior `start_booking`.
    #[error("No booking in progress")]
    NoPendingBooking,

    /// Driver is not among the discovered candidates.
    #[error("Driver {0} was not offered for this booking")]
    UnknownDriver(DriverId),

    /// Rating outside one to five stars.
    #[error("Rating must be 1-5 stars, got {0}")]
    InvalidRating(u8),

    /// Payment status change not allowed.
    #[error("Invalid payment transition: {from} -> {to}")]
    InvalidPaymentTransition {
        /// Current payment status.
        from: PaymentStatus,
        /// Requested payment status.
        to: PaymentStatus,
    },

    /// Fare components do not add up to the total.
    #[error("Fare components ({components}) do not match total ({total})")]
    InvalidFare {
        /// Sum of base, distance and time (saturating).
        components: u64,
        /// Declared total.
        total: u64,
    },

    /// Another ride operation is still running.
    #[error("Another ride operation is in progress")]
    OperationInProgress,

    /// Location update is for a different driver than the ride's.
    #[error("Location update for driver {got}, ride is assigned to {expected}")]
    DriverMismatch {
        /// Driver on the ride.
        expected: DriverId,
        /// Driver in the update.
        got: DriverId,
    },

    /// Backend failure.
    #[error("Service unavailable: {0}")]
    CollaboratorUnavailable(String),
}

/// Result alias for ride operations.
pub type RideResult<T> = Result<T, RideError>;

impl RideError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "not_authenticated",
            Self::MissingLocation(_) => "missing_location",
            Self::BookingFailed(_) => "booking_failed",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::RideAlreadyActive => "ride_already_active",
            Self::NoActiveRide => "no_active_ride",
            Self::NoPendingBooking => "no_pending_booking",
            Self::UnknownDriver(_) => "unknown_driver",
            Self::InvalidRating(_) => "invalid_rating",
            Self::InvalidPaymentTransition { .. } => "invalid_payment_transition",
            Self::InvalidFare { .. } => "invalid_fare",
            Self::OperationInProgress => "operation_in_progress",
            Self::DriverMismatch { .. } => "driver_mismatch",
            Self::CollaboratorUnavailable(_) => "collaborator_unavailable",
        }
    }

    /// Map a failure from `confirm_booking`.
    pub(crate) fn from_booking(err: GatewayError) -> Self {
        match err {
            GatewayError::Unavailable(reason) => Self::CollaboratorUnavailable(reason),
            GatewayError::Rejected(reason) => Self::BookingFailed(reason),
            other => Self::BookingFailed(other.to_string()),
        }
    }
}

impl From<GatewayError> for RideError {
    fn from(err: GatewayError) -> Self {
        Self::CollaboratorUnavailable(err.to_string())
    }
}
