//! # Inbound Ports
//!
//! The API the client runtime drives the Ride State Tracker through.

use async_trait::async_trait;
use shared_types::{DriverId, DriverSummary, GeoPoint, LocationDetails, RideId, VehicleType};

use crate::domain::{
    BookingDraft, DriverLocationUpdate, PaymentMethod, PaymentStatus, Ride, RideRating,
    RideResult, RideStatus, SafetyAlert, SafetyAlertKind,
};
use crate::ports::outbound::DriverLocationFeed;

/// Ride State Tracker API - inbound port.
#[async_trait]
pub trait RideTrackingApi: Send + Sync {
    /// Discover drivers for a trip. Creates no ride.
    async fn start_booking(
        &self,
        pickup: LocationDetails,
        drop: LocationDetails,
        vehicle_type: VehicleType,
    ) -> RideResult<Vec<DriverSummary>>;

    /// Book one of the discovered drivers. The ride comes back `accepted`.
    async fn confirm_ride(
        &self,
        driver_id: &DriverId,
        payment_method: PaymentMethod,
    ) -> RideResult<Ride>;

    /// Discard discovery results.
    fn cancel_booking(&self) -> RideResult<()>;

    /// Move the current ride to its immediate successor status.
    ///
    /// This and the other calls that change a booked ride fail with
    /// `NotAuthenticated` unless its passenger is the one signed in.
    async fn advance_status(&self, status: RideStatus) -> RideResult<Ride>;

    /// Attach an optional rating to a completed ride and file it.
    async fn complete_ride(&self, rating: Option<RideRating>) -> RideResult<Ride>;

    /// Cancel the current ride and file it.
    async fn cancel_ride(&self, reason: &str) -> RideResult<Ride>;

    /// Change the payment status of the current ride, or of the most
    /// recent filed ride when none is current.
    fn update_payment_status(&self, status: PaymentStatus) -> RideResult<Ride>;

    /// Subscribe to the assigned driver's position.
    async fn track_driver(&self) -> RideResult<DriverLocationFeed>;

    /// Record a position report on the current ride.
    fn apply_driver_location(&self, update: DriverLocationUpdate) -> RideResult<()>;

    /// Apply every report already queued on `feed`; returns the newest.
    fn poll_driver_location(
        &self,
        feed: &mut DriverLocationFeed,
    ) -> RideResult<Option<DriverLocationUpdate>>;

    /// Dispatch an emergency alert to the safety backend.
    async fn raise_sos(&self, kind: SafetyAlertKind, location: GeoPoint)
        -> RideResult<SafetyAlert>;

    /// Drop the draft, the current ride and the history of the passenger
    /// whose session just ended. Returns the id of the dropped current ride.
    fn end_session(&self) -> Option<RideId>;

    /// Snapshot of the ride in progress.
    fn current_ride(&self) -> Option<Ride>;

    /// Filed rides, newest first.
    fn history(&self) -> Vec<Ride>;

    /// Discovery results awaiting confirmation.
    fn booking_draft(&self) -> Option<BookingDraft>;
}
