//! # Outbound Ports
//!
//! Traits for the dispatch and safety backends and for reading the
//! signed-in identity, plus scriptable mocks.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{
    DriverId, DriverSummary, EmergencyContact, GatewayError, GeoPoint, Identity, RideId,
};
use shared_types::VehicleType;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

use crate::domain::{
    BookingRequest, DriverLocationUpdate, PaymentStatus, Ride, RideFare, RideStatus, SafetyAlert,
};

/// Buffered position reports per feed before the sender starts dropping.
pub const LOCATION_FEED_CAPACITY: usize = 64;

/// Push feed of driver positions. Dropping it unsubscribes.
#[derive(Debug)]
pub struct DriverLocationFeed {
    driver_id: DriverId,
    receiver: mpsc::Receiver<DriverLocationUpdate>,
}

impl DriverLocationFeed {
    /// Wrap a channel receiver.
    pub fn new(driver_id: DriverId, receiver: mpsc::Receiver<DriverLocationUpdate>) -> Self {
        Self {
            driver_id,
            receiver,
        }
    }

    /// Driver this feed follows.
    pub fn driver_id(&self) -> &DriverId {
        &self.driver_id
    }

    /// Wait for the next report. `None` once the backend closes the feed.
    pub async fn next(&mut self) -> Option<DriverLocationUpdate> {
        self.receiver.recv().await
    }

    /// Next queued report without waiting.
    pub fn try_next(&mut self) -> Option<DriverLocationUpdate> {
        self.receiver.try_recv().ok()
    }
}

/// Dispatch backend - outbound port.
#[async_trait]
pub trait DispatchGateway: Send + Sync {
    /// Drivers near `location` offering `vehicle_type`.
    async fn find_nearby_drivers(
        &self,
        location: &GeoPoint,
        vehicle_type: VehicleType,
    ) -> Result<Vec<DriverSummary>, GatewayError>;

    /// Create a ride with the chosen driver.
    async fn confirm_booking(&self, request: &BookingRequest) -> Result<Ride, GatewayError>;

    /// Start receiving position reports for `driver_id`.
    async fn subscribe_driver_location(
        &self,
        driver_id: &DriverId,
    ) -> Result<DriverLocationFeed, GatewayError>;
}

/// Safety backend - outbound port.
#[async_trait]
pub trait SafetyGateway: Send + Sync {
    /// Deliver an alert to the safety desk and the passenger's contacts.
    async fn dispatch_alert(
        &self,
        alert: &SafetyAlert,
        contacts: &[EmergencyContact],
    ) -> Result<(), GatewayError>;
}

/// Read access to the signed-in identity.
///
/// The runtime implements this over the session service; the tracker never
/// sees the session store itself.
pub trait IdentityProvider: Send + Sync {
    /// The signed-in identity, if any.
    fn current_identity(&self) -> Option<Identity>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

#[derive(Default)]
struct MockDispatchState {
    drivers: Vec<DriverSummary>,
    find_failure: Option<GatewayError>,
    confirm_failure: Option<GatewayError>,
    subscribe_failure: Option<GatewayError>,
    confirm_status: Option<RideStatus>,
    inflate_total: bool,
    next_ride: u64,
    feeds: HashMap<DriverId, Vec<mpsc::Sender<DriverLocationUpdate>>>,
}

/// Mock dispatch backend.
///
/// Returns whatever drivers it was given and books rides in `requested`
/// with a consistent fare unless told otherwise.
#[derive(Default)]
pub struct MockDispatchGateway {
    state: Mutex<MockDispatchState>,
    find_calls: AtomicUsize,
    confirm_calls: AtomicUsize,
    subscribe_calls: AtomicUsize,
}

impl MockDispatchGateway {
    /// Mock with no drivers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock offering `drivers`.
    pub fn with_drivers(drivers: Vec<DriverSummary>) -> Self {
        let mock = Self::default();
        mock.set_drivers(drivers);
        mock
    }

    /// Replace the driver list.
    pub fn set_drivers(&self, drivers: Vec<DriverSummary>) {
        self.state.lock().drivers = drivers;
    }

    /// Make `find_nearby_drivers` fail.
    pub fn fail_find(&self, err: Option<GatewayError>) {
        self.state.lock().find_failure = err;
    }

    /// Make `confirm_booking` fail.
    pub fn fail_confirm(&self, err: Option<GatewayError>) {
        self.state.lock().confirm_failure = err;
    }

    /// Make `subscribe_driver_location` fail.
    pub fn fail_subscribe(&self, err: Option<GatewayError>) {
        self.state.lock().subscribe_failure = err;
    }

    /// Return booked rides in `status` instead of `requested`.
    pub fn confirm_with_status(&self, status: Option<RideStatus>) {
        self.state.lock().confirm_status = status;
    }

    /// Return fares whose total exceeds the sum of the parts.
    pub fn inflate_fare_total(&self, inflate: bool) {
        self.state.lock().inflate_total = inflate;
    }

    /// Send a position report to every live feed for its driver.
    /// Returns how many feeds received it.
    pub fn push_location(&self, update: DriverLocationUpdate) -> usize {
        let mut state = self.state.lock();
        let Some(senders) = state.feeds.get_mut(&update.driver_id) else {
            return 0;
        };
        senders.retain(|s| !s.is_closed());
        senders
            .iter()
            .filter(|s| s.try_send(update.clone()).is_ok())
            .count()
    }

    /// Feeds still open for `driver_id`.
    pub fn active_feeds(&self, driver_id: &DriverId) -> usize {
        self.state
            .lock()
            .feeds
            .get(driver_id)
            .map(|senders| senders.iter().filter(|s| !s.is_closed()).count())
            .unwrap_or(0)
    }

    /// Number of `find_nearby_drivers` calls.
    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    /// Number of `confirm_booking` calls.
    pub fn confirm_calls(&self) -> usize {
        self.confirm_calls.load(Ordering::SeqCst)
    }

    /// Number of `subscribe_driver_location` calls.
    pub fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    fn fare_for(vehicle_type: VehicleType) -> RideFare {
        match vehicle_type {
            VehicleType::Bike => RideFare::new(2_000, 3_500, 500, "INR"),
            VehicleType::Auto => RideFare::new(3_000, 5_000, 800, "INR"),
            VehicleType::Car => RideFare::new(5_000, 9_000, 1_500, "INR"),
        }
    }
}

#[async_trait]
impl DispatchGateway for MockDispatchGateway {
    async fn find_nearby_drivers(
        &self,
        _location: &GeoPoint,
        _vehicle_type: VehicleType,
    ) -> Result<Vec<DriverSummary>, GatewayError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();
        match state.find_failure.clone() {
            Some(err) => Err(err),
            None => Ok(state.drivers.clone()),
        }
    }

    async fn confirm_booking(&self, request: &BookingRequest) -> Result<Ride, GatewayError> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        if let Some(err) = state.confirm_failure.clone() {
            return Err(err);
        }
        state.next_ride += 1;
        let mut fare = Self::fare_for(request.vehicle_type);
        if state.inflate_total {
            fare.total_amount += 100;
        }
        Ok(Ride {
            id: RideId(format!("ride-{}", state.next_ride)),
            passenger_id: request.passenger_id.clone(),
            driver_id: request.driver_id.clone(),
            status: state.confirm_status.unwrap_or(RideStatus::Requested),
            pickup: request.pickup.clone(),
            drop: request.drop.clone(),
            vehicle_type: request.vehicle_type,
            fare,
            payment_method: request.payment_method,
            payment_status: PaymentStatus::Pending,
            created_at: 0,
            updated_at: 0,
            started_at: None,
            ended_at: None,
            cancellation_reason: None,
            rating: None,
            safety_alerts: Vec::new(),
            driver_location: None,
        })
    }

    async fn subscribe_driver_location(
        &self,
        driver_id: &DriverId,
    ) -> Result<DriverLocationFeed, GatewayError> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        if let Some(err) = state.subscribe_failure.clone() {
            return Err(err);
        }
        let (sender, receiver) = mpsc::channel(LOCATION_FEED_CAPACITY);
        state
            .feeds
            .entry(driver_id.clone())
            .or_default()
            .push(sender);
        Ok(DriverLocationFeed::new(driver_id.clone(), receiver))
    }
}

#[derive(Default)]
struct MockSafetyState {
    failure: Option<GatewayError>,
    dispatched: Vec<(SafetyAlert, Vec<EmergencyContact>)>,
}

/// Mock safety backend that records every alert.
#[derive(Default)]
pub struct MockSafetyGateway {
    state: Mutex<MockSafetyState>,
}

impl MockSafetyGateway {
    /// Mock that accepts every alert.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `dispatch_alert` fail.
    pub fn fail_dispatch(&self, err: Option<GatewayError>) {
        self.state.lock().failure = err;
    }

    /// Alerts delivered so far with the contacts they went to.
    pub fn dispatched(&self) -> Vec<(SafetyAlert, Vec<EmergencyContact>)> {
        self.state.lock().dispatched.clone()
    }
}

#[async_trait]
impl SafetyGateway for MockSafetyGateway {
    async fn dispatch_alert(
        &self,
        alert: &SafetyAlert,
        contacts: &[EmergencyContact],
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        if let Some(err) = state.failure.clone() {
            return Err(err);
        }
        state.dispatched.push((alert.clone(), contacts.to_vec()));
        Ok(())
    }
}

/// Identity provider holding a fixed, replaceable identity.
#[derive(Default)]
pub struct StaticIdentityProvider {
    identity: RwLock<Option<Identity>>,
}

impl StaticIdentityProvider {
    /// Provider with nobody signed in.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Provider with `identity` signed in.
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: RwLock::new(Some(identity)),
        }
    }

    /// Replace the identity (`None` signs out).
    pub fn set(&self, identity: Option<Identity>) {
        *self.identity.write() = identity;
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn current_identity(&self) -> Option<Identity> {
        self.identity.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{LocationDetails, Timestamp, UserId};
    use crate::domain::PaymentMethod;

    fn update(driver: &str, at: Timestamp) -> DriverLocationUpdate {
        DriverLocationUpdate {
            driver_id: DriverId(driver.into()),
            location: GeoPoint::new(12.97, 77.59),
            heading: None,
            recorded_at: at,
        }
    }

    #[tokio::test]
    async fn test_feed_drop_unsubscribes() {
        let dispatch = MockDispatchGateway::new();
        let driver = DriverId("d1".into());

        let mut feed = dispatch.subscribe_driver_location(&driver).await.unwrap();
        assert_eq!(dispatch.active_feeds(&driver), 1);
        assert_eq!(dispatch.push_location(update("d1", 1)), 1);
        assert_eq!(feed.try_next().map(|u| u.recorded_at), Some(1));
        assert!(feed.try_next().is_none());

        drop(feed);
        assert_eq!(dispatch.active_feeds(&driver), 0);
        assert_eq!(dispatch.push_location(update("d1", 2)), 0);
    }

    #[tokio::test]
    async fn test_confirm_booking_defaults() {
        let dispatch = MockDispatchGateway::new();
        let request = BookingRequest {
            passenger_id: UserId("u".into()),
            driver_id: DriverId("d1".into()),
            pickup: LocationDetails::from_address("A"),
            drop: LocationDetails::from_address("B"),
            vehicle_type: VehicleType::Auto,
            payment_method: PaymentMethod::Upi,
        };
        let ride = dispatch.confirm_booking(&request).await.unwrap();
        assert_eq!(ride.status, RideStatus::Requested);
        assert_eq!(ride.fare.total_amount, 8_800);
        assert_eq!(dispatch.confirm_calls(), 1);
    }

    #[test]
    fn test_static_identity_provider() {
        let provider = StaticIdentityProvider::signed_out();
        assert!(provider.current_identity().is_none());
        provider.set(Some(Identity::new_verified(UserId("u".into()), "+919876543210", 0)));
        assert!(provider.current_identity().is_some());
    }
}
