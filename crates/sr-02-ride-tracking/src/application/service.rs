//! # Ride Tracking Service
//!
//! Application service owning the booking draft, the current ride and the
//! filed-ride history.
//!
//! Like the session service, state sits behind a `parking_lot::RwLock`
//! that is never held across an `.await`, and booking/lifecycle calls claim
//! a [`SingleFlight`] slot. `raise_sos` deliberately does not: an alert
//! must go out even while a booking call is suspended.

use async_trait::async_trait;
use parking_lot::RwLock;
use saferide_telemetry::{log_event, log_ride_event};
use shared_bus::{EventPublisher, RideOutcome, SafeRideEvent};
use shared_types::{
    DriverId, DriverSummary, FlightGuard, GeoPoint, Identity, LocationDetails, RideId,
    SingleFlight, TimeSource, VehicleType,
};
use std::collections::VecDeque;
use std::sync::Arc;

use crate::config::RideConfig;
use crate::domain::{
    invariant_fare_consistent, invariant_next_status, invariant_rating, rank_drivers, AlertId,
    BookingDraft, BookingRequest, DriverLocationUpdate, PaymentMethod, PaymentStatus, Ride,
    RideError, RideRating, RideResult, RideStatus, SafetyAlert, SafetyAlertKind,
};
use crate::ports::{
    DispatchGateway, DriverLocationFeed, IdentityProvider, RideTrackingApi, SafetyGateway,
};

const SUBSYSTEM: &str = "ride-tracking";

#[derive(Default)]
struct RideInner {
    draft: Option<BookingDraft>,
    current: Option<Ride>,
    /// Newest first.
    history: VecDeque<Ride>,
}

/// Ride State Tracker service.
pub struct RideTrackingService<D: DispatchGateway, S: SafetyGateway> {
    config: RideConfig,
    dispatch: Arc<D>,
    safety: Arc<S>,
    identity: Arc<dyn IdentityProvider>,
    publisher: Arc<dyn EventPublisher>,
    time: Arc<dyn TimeSource>,
    inner: RwLock<RideInner>,
    in_flight: SingleFlight,
}

impl<D: DispatchGateway, S: SafetyGateway> RideTrackingService<D, S> {
    /// Create a tracker with no ride and empty history.
    pub fn new(
        config: RideConfig,
        dispatch: Arc<D>,
        safety: Arc<S>,
        identity: Arc<dyn IdentityProvider>,
        publisher: Arc<dyn EventPublisher>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            dispatch,
            safety,
            identity,
            publisher,
            time,
            inner: RwLock::new(RideInner::default()),
            in_flight: SingleFlight::new(),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &RideConfig {
        &self.config
    }

    fn begin(&self) -> RideResult<FlightGuard<'_>> {
        self.in_flight
            .try_acquire()
            .ok_or(RideError::OperationInProgress)
    }

    fn require_identity(&self) -> RideResult<Identity> {
        self.identity
            .current_identity()
            .ok_or(RideError::NotAuthenticated)
    }

    /// Fails unless the same passenger is still signed in. Checked again
    /// after every backend call, since the session can end mid-flight.
    fn require_same_identity(&self, identity: &Identity) -> RideResult<()> {
        match self.identity.current_identity() {
            Some(current) if current.uid == identity.uid => Ok(()),
            _ => Err(RideError::NotAuthenticated),
        }
    }

    /// Move the current ride into history. Caller has already set the
    /// terminal status.
    async fn file_current(&self, outcome: RideOutcome) -> RideResult<Ride> {
        let ride = {
            let mut inner = self.inner.write();
            let ride = inner.current.take().ok_or(RideError::NoActiveRide)?;
            inner.history.push_front(ride.clone());
            if self.config.max_history > 0 {
                inner.history.truncate(self.config.max_history);
            }
            ride
        };

        log_ride_event!(
            info,
            SUBSYSTEM,
            "Ride filed",
            ride.id,
            outcome = outcome.as_str()
        );
        self.publisher
            .publish(SafeRideEvent::RideFiled {
                ride_id: ride.id.clone(),
                outcome,
            })
            .await;

        Ok(ride)
    }

    async fn announce_status(&self, ride: &Ride) {
        self.publisher
            .publish(SafeRideEvent::RideStatusChanged {
                ride_id: ride.id.clone(),
                status: ride.status.as_str().to_string(),
            })
            .await;
    }
}

#[async_trait]
impl<D: DispatchGateway + 'static, S: SafetyGateway + 'static> RideTrackingApi
    for RideTrackingService<D, S>
{
    async fn start_booking(
        &self,
        pickup: LocationDetails,
        drop: LocationDetails,
        vehicle_type: VehicleType,
    ) -> RideResult<Vec<DriverSummary>> {
        if pickup.is_empty() {
            return Err(RideError::MissingLocation("pickup"));
        }
        if drop.is_empty() {
            return Err(RideError::MissingLocation("drop"));
        }
        let identity = self.require_identity()?;
        let _flight = self.begin()?;
        if self.inner.read().current.is_some() {
            return Err(RideError::RideAlreadyActive);
        }

        let found = self
            .dispatch
            .find_nearby_drivers(&pickup.coordinates, vehicle_type)
            .await?;
        self.require_same_identity(&identity)?;
        let drivers = rank_drivers(found, vehicle_type, self.config.min_driver_rating);

        self.inner.write().draft = Some(BookingDraft {
            pickup,
            drop,
            vehicle_type,
            drivers: drivers.clone(),
            started_at: self.time.now(),
        });

        log_event!(
            info,
            SUBSYSTEM,
            "Drivers discovered",
            uid = %identity.uid,
            vehicle_type = %vehicle_type,
            drivers = drivers.len()
        );
        Ok(drivers)
    }

    async fn confirm_ride(
        &self,
        driver_id: &DriverId,
        payment_method: PaymentMethod,
    ) -> RideResult<Ride> {
        let identity = self.require_identity()?;
        let _flight = self.begin()?;

        let draft = {
            let inner = self.inner.read();
            if inner.current.is_some() {
                return Err(RideError::RideAlreadyActive);
            }
            inner.draft.clone().ok_or(RideError::NoPendingBooking)?
        };
        if draft.driver(driver_id).is_none() {
            return Err(RideError::UnknownDriver(driver_id.clone()));
        }

        let request = BookingRequest {
            passenger_id: identity.uid.clone(),
            driver_id: driver_id.clone(),
            pickup: draft.pickup,
            drop: draft.drop,
            vehicle_type: draft.vehicle_type,
            payment_method,
        };
        let mut ride = self
            .dispatch
            .confirm_booking(&request)
            .await
            .map_err(RideError::from_booking)?;
        self.require_same_identity(&identity)?;

        if ride.status != RideStatus::Requested {
            return Err(RideError::BookingFailed(format!(
                "backend returned ride in status {}",
                ride.status
            )));
        }
        invariant_fare_consistent(&ride.fare)
            .map_err(|e| RideError::BookingFailed(e.to_string()))?;
        invariant_next_status(ride.status, RideStatus::Accepted)?;

        let now = self.time.now();
        ride.status = RideStatus::Accepted;
        ride.payment_status = PaymentStatus::Pending;
        ride.updated_at = now;

        {
            let mut inner = self.inner.write();
            inner.current = Some(ride.clone());
            inner.draft = None;
        }

        log_ride_event!(
            info,
            SUBSYSTEM,
            "Ride accepted",
            ride.id,
            driver_id = %ride.driver_id,
            total = ride.fare.total_amount
        );
        self.announce_status(&ride).await;

        Ok(ride)
    }

    fn cancel_booking(&self) -> RideResult<()> {
        let _flight = self.begin()?;
        match self.inner.write().draft.take() {
            Some(_) => {
                log_event!(debug, SUBSYSTEM, "Booking draft discarded");
                Ok(())
            }
            None => Err(RideError::NoPendingBooking),
        }
    }

    async fn advance_status(&self, status: RideStatus) -> RideResult<Ride> {
        let identity = self.require_identity()?;
        let _flight = self.begin()?;

        let ride = {
            let mut inner = self.inner.write();
            let ride = inner.current.as_mut().ok_or(RideError::NoActiveRide)?;
            ensure_owner(ride, &identity)?;
            invariant_next_status(ride.status, status)?;

            let now = self.time.now();
            ride.status = status;
            ride.updated_at = now;
            match status {
                RideStatus::TripStarted => ride.started_at = Some(now),
                RideStatus::TripCompleted => ride.ended_at = Some(now),
                _ => {}
            }
            ride.clone()
        };

        log_ride_event!(info, SUBSYSTEM, "Ride status advanced", ride.id, status = %status);
        self.announce_status(&ride).await;

        Ok(ride)
    }

    async fn complete_ride(&self, rating: Option<RideRating>) -> RideResult<Ride> {
        let identity = self.require_identity()?;
        let _flight = self.begin()?;

        {
            let mut inner = self.inner.write();
            let ride = inner.current.as_mut().ok_or(RideError::NoActiveRide)?;
            ensure_owner(ride, &identity)?;
            if ride.status != RideStatus::TripCompleted {
                return Err(RideError::InvalidTransition {
                    from: ride.status,
                    to: RideStatus::TripCompleted,
                });
            }
            if let Some(rating) = &rating {
                invariant_rating(rating)?;
            }
            if rating.is_some() {
                ride.rating = rating;
                ride.updated_at = self.time.now();
            }
        }

        self.file_current(RideOutcome::Completed).await
    }

    async fn cancel_ride(&self, reason: &str) -> RideResult<Ride> {
        let identity = self.require_identity()?;
        let _flight = self.begin()?;

        let ride = {
            let mut inner = self.inner.write();
            let ride = inner.current.as_mut().ok_or(RideError::NoActiveRide)?;
            ensure_owner(ride, &identity)?;
            if ride.status.is_terminal() {
                return Err(RideError::InvalidTransition {
                    from: ride.status,
                    to: RideStatus::TripCancelled,
                });
            }

            let now = self.time.now();
            let reason = reason.trim();
            ride.status = RideStatus::TripCancelled;
            ride.cancellation_reason = (!reason.is_empty()).then(|| reason.to_string());
            ride.updated_at = now;
            ride.ended_at = Some(now);
            ride.clone()
        };

        log_ride_event!(
            info,
            SUBSYSTEM,
            "Ride cancelled",
            ride.id,
            reason = ride.cancellation_reason.as_deref().unwrap_or("")
        );
        self.announce_status(&ride).await;
        self.file_current(RideOutcome::Cancelled).await
    }

    fn update_payment_status(&self, status: PaymentStatus) -> RideResult<Ride> {
        let identity = self.require_identity()?;
        let mut inner = self.inner.write();
        let RideInner {
            current, history, ..
        } = &mut *inner;
        let ride = current
            .as_mut()
            .or_else(|| history.front_mut())
            .ok_or(RideError::NoActiveRide)?;
        ensure_owner(ride, &identity)?;

        if !ride.payment_status.can_transition_to(status) {
            return Err(RideError::InvalidPaymentTransition {
                from: ride.payment_status,
                to: status,
            });
        }
        ride.payment_status = status;
        ride.updated_at = self.time.now();

        log_ride_event!(info, SUBSYSTEM, "Payment status updated", ride.id, payment = %status);
        Ok(ride.clone())
    }

    async fn track_driver(&self) -> RideResult<DriverLocationFeed> {
        let identity = self.require_identity()?;
        let _flight = self.begin()?;
        let (ride_id, driver_id) = {
            let inner = self.inner.read();
            let ride = inner.current.as_ref().ok_or(RideError::NoActiveRide)?;
            ensure_owner(ride, &identity)?;
            (ride.id.clone(), ride.driver_id.clone())
        };

        let feed = self.dispatch.subscribe_driver_location(&driver_id).await?;
        log_ride_event!(debug, SUBSYSTEM, "Tracking driver", ride_id, driver_id = %driver_id);
        Ok(feed)
    }

    fn apply_driver_location(&self, update: DriverLocationUpdate) -> RideResult<()> {
        let mut inner = self.inner.write();
        let ride = inner.current.as_mut().ok_or(RideError::NoActiveRide)?;
        if ride.driver_id != update.driver_id {
            return Err(RideError::DriverMismatch {
                expected: ride.driver_id.clone(),
                got: update.driver_id,
            });
        }

        // Reports can arrive out of order; keep the newest.
        let stale = ride
            .driver_location
            .as_ref()
            .is_some_and(|last| last.recorded_at > update.recorded_at);
        if !stale {
            ride.driver_location = Some(update);
        }
        Ok(())
    }

    fn poll_driver_location(
        &self,
        feed: &mut DriverLocationFeed,
    ) -> RideResult<Option<DriverLocationUpdate>> {
        let mut latest = None;
        while let Some(update) = feed.try_next() {
            self.apply_driver_location(update.clone())?;
            latest = Some(update);
        }
        Ok(latest)
    }

    async fn raise_sos(
        &self,
        kind: SafetyAlertKind,
        location: GeoPoint,
    ) -> RideResult<SafetyAlert> {
        let identity = self.require_identity()?;
        let ride_id = self.inner.read().current.as_ref().map(|r| r.id.clone());

        let alert = SafetyAlert {
            id: AlertId::generate(),
            kind,
            location,
            raised_at: self.time.now(),
            ride_id: ride_id.clone(),
            passenger_id: identity.uid.clone(),
        };

        if let Err(e) = self
            .safety
            .dispatch_alert(&alert, &identity.emergency_contacts)
            .await
        {
            log_event!(
                error,
                SUBSYSTEM,
                "SOS dispatch failed",
                alert_id = %alert.id,
                error = %e
            );
            return Err(e.into());
        }

        {
            let mut inner = self.inner.write();
            if let Some(ride) = inner
                .current
                .as_mut()
                .filter(|r| Some(&r.id) == alert.ride_id.as_ref())
            {
                ride.safety_alerts.push(alert.clone());
            }
        }

        log_event!(
            warn,
            SUBSYSTEM,
            "SOS raised",
            alert_id = %alert.id,
            kind = kind.as_str(),
            contacts = identity.emergency_contacts.len()
        );
        self.publisher
            .publish(SafeRideEvent::SosRaised {
                alert_id: alert.id.to_string(),
                ride_id,
            })
            .await;

        Ok(alert)
    }

    fn end_session(&self) -> Option<RideId> {
        let dropped = std::mem::take(&mut *self.inner.write());
        let ride_id = dropped.current.map(|ride| ride.id);
        log_event!(
            info,
            SUBSYSTEM,
            "Ride state cleared",
            dropped_ride = ride_id.is_some(),
            dropped_draft = dropped.draft.is_some(),
            history = dropped.history.len()
        );
        ride_id
    }

    fn current_ride(&self) -> Option<Ride> {
        self.inner.read().current.clone()
    }

    fn history(&self) -> Vec<Ride> {
        self.inner.read().history.iter().cloned().collect()
    }

    fn booking_draft(&self) -> Option<BookingDraft> {
        self.inner.read().draft.clone()
    }
}

fn ensure_owner(ride: &Ride, identity: &Identity) -> RideResult<()> {
    if ride.passenger_id == identity.uid {
        Ok(())
    } else {
        Err(RideError::NotAuthenticated)
    }
}
