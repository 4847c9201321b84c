//! # SafeRide Client
//!
//! Composition root: owns the event bus, the three subsystem stores and
//! the router between them, and exposes one facade over all of it.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: Event bus, relays (no dependencies)
//! Level 1: Session Manager (bus)
//! Level 2: Ride State Tracker (bus, Session Manager through IdentityProvider)
//! Level 3: Event router (bus, Ride State Tracker, relays)
//! ```
//!
//! ## Consistency
//!
//! Every facade call drains the router before returning, so relay state
//! already reflects whatever the call published.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use saferide_telemetry::{
    init_telemetry, log_event, metric_inc, HistogramTimer, TelemetryGuard, SUBSYSTEM_ERRORS,
};
use shared_bus::{EventPublisher, InMemoryEventBus, SafeRideEvent};
use shared_types::{
    DriverId, DriverSummary, EmergencyContact, GeoPoint, Identity, LocationDetails, RideId,
    SystemTimeSource, TimeSource, VehicleType,
};
use sr_01_session::{
    AuthGateway, ChallengeToken, MockAuthGateway, MockProfileStore, NewEmergencyContact,
    PendingChallenge, ProfileStore, ProfileUpdate, SessionApi, SessionService, StateKind,
};
use sr_02_ride_tracking::{
    BookingDraft, DispatchGateway, DriverLocationFeed, DriverLocationUpdate, MockDispatchGateway,
    MockSafetyGateway, PaymentMethod, PaymentStatus, Ride, RideError, RideRating,
    RideStatus, RideTrackingApi, RideTrackingService, SafetyAlert, SafetyAlertKind, SafetyGateway,
};
use sr_03_relay::{
    ChatMessage, ChatRelay, Notification, NotificationId, NotificationKind, NotificationRelay,
    Origin,
};

use crate::adapters::SessionIdentityAdapter;
use crate::container::config::ClientConfig;
use crate::errors::{ClientError, ClientResult};
use crate::wiring::EventRouter;

const SUBSYSTEM: &str = "runtime";

/// Backends the client talks to.
pub struct Collaborators<A, P, D, S> {
    /// Phone verification backend.
    pub auth: Arc<A>,
    /// Profile persistence.
    pub profiles: Arc<P>,
    /// Driver discovery and booking backend.
    pub dispatch: Arc<D>,
    /// Emergency alert backend.
    pub safety: Arc<S>,
    /// Clock shared by every store.
    pub time: Arc<dyn TimeSource>,
}

impl Collaborators<MockAuthGateway, MockProfileStore, MockDispatchGateway, MockSafetyGateway> {
    /// In-memory mocks on `time`.
    pub fn mocks(time: Arc<dyn TimeSource>) -> Self {
        Self {
            auth: Arc::new(MockAuthGateway::new()),
            profiles: Arc::new(MockProfileStore::new()),
            dispatch: Arc::new(MockDispatchGateway::new()),
            safety: Arc::new(MockSafetyGateway::new()),
            time,
        }
    }

    /// In-memory mocks on the system clock.
    pub fn mocks_with_system_time() -> Self {
        Self::mocks(Arc::new(SystemTimeSource))
    }
}

/// Client wired to in-memory mock backends.
pub type MockClient =
    SafeRideClient<MockAuthGateway, MockProfileStore, MockDispatchGateway, MockSafetyGateway>;

/// The passenger client core.
pub struct SafeRideClient<A, P, D, S>
where
    A: AuthGateway + 'static,
    P: ProfileStore + 'static,
    D: DispatchGateway + 'static,
    S: SafetyGateway + 'static,
{
    config: ClientConfig,
    bus: Arc<InMemoryEventBus>,
    session: Arc<SessionService<A, P>>,
    rides: Arc<RideTrackingService<D, S>>,
    chat: Arc<RwLock<ChatRelay>>,
    notifications: Arc<RwLock<NotificationRelay>>,
    router: Mutex<EventRouter>,
}

impl<A, P, D, S> SafeRideClient<A, P, D, S>
where
    A: AuthGateway + 'static,
    P: ProfileStore + 'static,
    D: DispatchGateway + 'static,
    S: SafetyGateway + 'static,
{
    /// Validate `config` and wire the stores together.
    pub fn new(config: ClientConfig, collaborators: Collaborators<A, P, D, S>) -> ClientResult<Self> {
        config.validate()?;
        let Collaborators {
            auth,
            profiles,
            dispatch,
            safety,
            time,
        } = collaborators;

        // Level 0
        let bus = Arc::new(InMemoryEventBus::with_capacity(config.event_bus_capacity));
        let publisher: Arc<dyn EventPublisher> = bus.clone();
        let chat = Arc::new(RwLock::new(ChatRelay::new(&config.relay, time.clone())));
        let notifications = Arc::new(RwLock::new(NotificationRelay::new(
            &config.relay,
            time.clone(),
        )));

        // Level 1
        let session = Arc::new(SessionService::new(
            config.session.clone(),
            auth,
            profiles,
            publisher.clone(),
            time.clone(),
        ));

        // Level 2
        let identity = Arc::new(SessionIdentityAdapter::new(session.clone()));
        let rides = Arc::new(RideTrackingService::new(
            config.ride.clone(),
            dispatch,
            safety,
            identity,
            publisher,
            time,
        ));

        // Level 3
        let router = EventRouter::new(&bus, rides.clone(), chat.clone(), notifications.clone());

        log_event!(
            info,
            SUBSYSTEM,
            "SafeRide client ready",
            country_code = %config.session.country_code,
            bus_capacity = config.event_bus_capacity
        );

        Ok(Self {
            config,
            bus,
            session,
            rides,
            chat,
            notifications,
            router: Mutex::new(router),
        })
    }

    /// Install the tracing subscriber and register metrics.
    ///
    /// Keep the guard alive for as long as logs should be written.
    pub fn install_telemetry(&self) -> ClientResult<TelemetryGuard> {
        Ok(init_telemetry(&self.config.telemetry)?)
    }

    /// Route every event published so far. Returns how many were routed.
    pub fn sync(&self) -> usize {
        self.router.lock().drain()
    }

    fn finish<T, E>(&self, operation: &'static str, result: Result<T, E>) -> ClientResult<T>
    where
        E: Into<ClientError>,
    {
        self.sync();
        result.map_err(|e| {
            let err = e.into();
            let (subsystem, kind) = err.metric_labels();
            metric_inc!(SUBSYSTEM_ERRORS, &[subsystem, kind]);
            log_event!(
                debug,
                SUBSYSTEM,
                "Operation failed",
                operation = operation,
                error = %err
            );
            err
        })
    }

    // =========================================================================
    // SESSION
    // =========================================================================

    /// Send a verification code to `phone`.
    pub async fn request_challenge(&self, phone: &str) -> ClientResult<ChallengeToken> {
        let _timer = HistogramTimer::operation("request_challenge");
        let result = self.session.request_challenge(phone).await;
        self.finish("request_challenge", result)
    }

    /// Send a new code, subject to the resend cooldown.
    pub async fn resend_challenge(&self, phone: &str) -> ClientResult<ChallengeToken> {
        let _timer = HistogramTimer::operation("resend_challenge");
        let result = self.session.resend_challenge(phone).await;
        self.finish("resend_challenge", result)
    }

    /// Sign in with the code the passenger typed.
    pub async fn verify_challenge(
        &self,
        token: &ChallengeToken,
        code: &str,
    ) -> ClientResult<Identity> {
        let _timer = HistogramTimer::operation("verify_challenge");
        let result = self.session.verify_challenge(token, code).await;
        self.finish("verify_challenge", result)
    }

    /// Drop the pending challenge.
    pub fn abandon_challenge(&self) -> ClientResult<()> {
        let result = self.session.abandon_challenge();
        self.finish("abandon_challenge", result)
    }

    /// Patch profile fields.
    pub async fn update_profile(&self, update: ProfileUpdate) -> ClientResult<Identity> {
        let _timer = HistogramTimer::operation("update_profile");
        let result = self.session.update_profile(update).await;
        self.finish("update_profile", result)
    }

    /// Add an emergency contact to the signed-in profile.
    pub async fn add_emergency_contact(
        &self,
        contact: NewEmergencyContact,
    ) -> ClientResult<EmergencyContact> {
        let _timer = HistogramTimer::operation("add_emergency_contact");
        let result = self.session.add_emergency_contact(contact).await;
        self.finish("add_emergency_contact", result)
    }

    /// Sign out. Account notifications are cleared once the backend agrees.
    pub async fn sign_out(&self) -> ClientResult<()> {
        let _timer = HistogramTimer::operation("sign_out");
        let result = self.session.sign_out().await;
        self.finish("sign_out", result)
    }

    pub fn state_kind(&self) -> StateKind {
        self.session.state_kind()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.session.identity()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn pending_challenge(&self) -> Option<PendingChallenge> {
        self.session.pending_challenge()
    }

    /// Seconds until a resend is allowed, `None` if allowed now.
    pub fn resend_available_in(&self) -> Option<u64> {
        self.session.resend_available_in()
    }

    // =========================================================================
    // RIDES
    // =========================================================================

    /// Look for drivers between `pickup` and `drop`.
    pub async fn start_booking(
        &self,
        pickup: LocationDetails,
        drop: LocationDetails,
        vehicle_type: VehicleType,
    ) -> ClientResult<Vec<DriverSummary>> {
        let _timer = HistogramTimer::operation("start_booking");
        let result = self.rides.start_booking(pickup, drop, vehicle_type).await;
        self.finish("start_booking", result)
    }

    /// Book a discovered driver.
    pub async fn confirm_ride(
        &self,
        driver_id: &DriverId,
        payment_method: PaymentMethod,
    ) -> ClientResult<Ride> {
        let _timer = HistogramTimer::operation("confirm_ride");
        let result = self.rides.confirm_ride(driver_id, payment_method).await;
        self.finish("confirm_ride", result)
    }

    /// Discard the discovery results.
    pub fn cancel_booking(&self) -> ClientResult<()> {
        let result = self.rides.cancel_booking();
        self.finish("cancel_booking", result)
    }

    /// Apply a status update reported by dispatch.
    pub async fn advance_status(&self, status: RideStatus) -> ClientResult<Ride> {
        let result = self.rides.advance_status(status).await;
        self.finish("advance_status", result)
    }

    /// File a completed ride with an optional rating.
    pub async fn complete_ride(&self, rating: Option<RideRating>) -> ClientResult<Ride> {
        let result = self.rides.complete_ride(rating).await;
        self.finish("complete_ride", result)
    }

    /// Cancel and file the current ride.
    pub async fn cancel_ride(&self, reason: &str) -> ClientResult<Ride> {
        let result = self.rides.cancel_ride(reason).await;
        self.finish("cancel_ride", result)
    }

    pub fn update_payment_status(&self, status: PaymentStatus) -> ClientResult<Ride> {
        let result = self.rides.update_payment_status(status);
        self.finish("update_payment_status", result)
    }

    /// Subscribe to the assigned driver's position.
    pub async fn track_driver(&self) -> ClientResult<DriverLocationFeed> {
        let _timer = HistogramTimer::operation("track_driver");
        let result = self.rides.track_driver().await;
        self.finish("track_driver", result)
    }

    /// Apply queued position reports; returns the newest.
    pub fn poll_driver_location(
        &self,
        feed: &mut DriverLocationFeed,
    ) -> ClientResult<Option<DriverLocationUpdate>> {
        let result = self.rides.poll_driver_location(feed);
        self.finish("poll_driver_location", result)
    }

    /// Alert emergency contacts and the safety backend.
    pub async fn raise_sos(
        &self,
        kind: SafetyAlertKind,
        location: GeoPoint,
    ) -> ClientResult<SafetyAlert> {
        let _timer = HistogramTimer::operation("raise_sos");
        let result = self.rides.raise_sos(kind, location).await;
        self.finish("raise_sos", result)
    }

    pub fn current_ride(&self) -> Option<Ride> {
        self.rides.current_ride()
    }

    /// Filed rides, newest first.
    pub fn history(&self) -> Vec<Ride> {
        self.rides.history()
    }

    pub fn booking_draft(&self) -> Option<BookingDraft> {
        self.rides.booking_draft()
    }

    // =========================================================================
    // CHAT
    // =========================================================================

    /// Send a message from the passenger on the current ride.
    pub async fn send_message(&self, body: &str) -> ClientResult<ChatMessage> {
        let result = match self.rides.current_ride() {
            Some(ride) => self.append_message(&ride.id, Origin::Local, body).await,
            None => Err(ClientError::Ride(RideError::NoActiveRide)),
        };
        self.finish("send_message", result)
    }

    /// Record a message from `sender` on `ride_id`.
    ///
    /// Messages for anything but the current ride are refused so a late
    /// delivery cannot reopen a conversation that was already cleared.
    pub async fn receive_message(
        &self,
        ride_id: &RideId,
        sender: &str,
        body: &str,
    ) -> ClientResult<ChatMessage> {
        let result = match self.rides.current_ride() {
            Some(ride) if &ride.id == ride_id => {
                self.append_message(ride_id, Origin::Remote(sender.to_string()), body)
                    .await
            }
            _ => Err(ClientError::Ride(RideError::NoActiveRide)),
        };
        self.finish("receive_message", result)
    }

    async fn append_message(
        &self,
        ride_id: &RideId,
        origin: Origin,
        body: &str,
    ) -> ClientResult<ChatMessage> {
        let local = origin.is_local();
        let message = self.chat.write().append_message(ride_id, origin, body)?;
        self.bus
            .publish(SafeRideEvent::MessageRelayed {
                ride_id: ride_id.clone(),
                local,
            })
            .await;
        Ok(message)
    }

    /// Mark a conversation read. Returns how many messages changed.
    pub fn mark_chat_read(&self, ride_id: &RideId) -> usize {
        self.chat.write().mark_read(ride_id)
    }

    /// Conversation for `ride_id`, oldest first.
    pub fn messages(&self, ride_id: &RideId) -> Vec<ChatMessage> {
        self.chat.read().messages(ride_id)
    }

    pub fn chat_unread(&self, ride_id: &RideId) -> usize {
        self.chat.read().unread(ride_id)
    }

    // =========================================================================
    // NOTIFICATIONS
    // =========================================================================

    /// Record a notification delivered by the push channel.
    pub fn push_notification(
        &self,
        kind: NotificationKind,
        title: &str,
        body: &str,
        ride_id: Option<RideId>,
    ) -> Notification {
        self.notifications.write().push(kind, title, body, ride_id)
    }

    pub fn mark_notification_read(&self, id: &NotificationId) -> ClientResult<()> {
        let result = self.notifications.write().mark_read(id);
        self.finish("mark_notification_read", result)
    }

    pub fn mark_all_notifications_read(&self) {
        self.notifications.write().mark_all_read();
    }

    /// Notifications, newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.read().notifications()
    }

    pub fn unread_notifications(&self) -> usize {
        self.notifications.read().unread()
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The bus, for hosts that want their own subscriptions.
    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    /// Events the router has routed so far.
    pub fn events_routed(&self) -> u64 {
        self.router.lock().routed()
    }
}
