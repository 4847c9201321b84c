//! # Session Service
//!
//! Application service owning the authentication lifecycle.
//!
//! State lives behind a `parking_lot::RwLock` and is never held across an
//! `.await`. Every operation that calls a collaborator claims the
//! service's [`SingleFlight`] slot first, so state cannot change under a
//! suspended call.

use async_trait::async_trait;
use parking_lot::RwLock;
use saferide_telemetry::log_event;
use shared_bus::{EventPublisher, SafeRideEvent};
use shared_types::{
    mask_phone, ContactId, Cooldown, EmergencyContact, FlightGuard, Identity, SingleFlight,
    TimeSource,
};
use std::sync::Arc;

use crate::config::SessionConfig;
use crate::domain::{
    validate_display_name, validate_email, ChallengeToken, NewEmergencyContact, PendingChallenge,
    PhoneNumber, ProfileUpdate, SessionError, SessionResult, SessionState, StateKind,
    VerificationCode,
};
use crate::ports::{AuthGateway, ProfileStore, SessionApi};

const SUBSYSTEM: &str = "session";

struct SessionInner {
    state: SessionState,
    resend: Cooldown,
}

/// Session Manager service.
pub struct SessionService<A: AuthGateway, P: ProfileStore> {
    config: SessionConfig,
    auth: Arc<A>,
    profiles: Arc<P>,
    publisher: Arc<dyn EventPublisher>,
    time: Arc<dyn TimeSource>,
    inner: RwLock<SessionInner>,
    in_flight: SingleFlight,
}

impl<A: AuthGateway, P: ProfileStore> SessionService<A, P> {
    /// Create a signed-out session.
    pub fn new(
        config: SessionConfig,
        auth: Arc<A>,
        profiles: Arc<P>,
        publisher: Arc<dyn EventPublisher>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let resend = Cooldown::from_secs(config.resend_cooldown_secs);
        Self {
            config,
            auth,
            profiles,
            publisher,
            time,
            inner: RwLock::new(SessionInner {
                state: SessionState::Unauthenticated,
                resend,
            }),
            in_flight: SingleFlight::new(),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn begin(&self) -> SessionResult<FlightGuard<'_>> {
        self.in_flight
            .try_acquire()
            .ok_or(SessionError::OperationInProgress)
    }

    fn require_identity(&self) -> SessionResult<Identity> {
        self.inner
            .read()
            .state
            .identity()
            .cloned()
            .ok_or(SessionError::NotAuthenticated)
    }

    async fn send_challenge(&self, raw_phone: &str, resend: bool) -> SessionResult<ChallengeToken> {
        let _flight = self.begin()?;
        let phone = PhoneNumber::parse(raw_phone, &self.config.country_code)?;

        {
            let inner = self.inner.read();
            if inner.state.kind() == StateKind::Authenticated {
                return Err(SessionError::AlreadyAuthenticated);
            }
            // A fresh request while a code is pending counts as a resend.
            if resend || inner.state.kind() == StateKind::ChallengeSent {
                if let Some(retry_after_secs) = inner.resend.remaining_secs(self.time.now()) {
                    log_event!(
                        debug,
                        SUBSYSTEM,
                        "Resend refused by cooldown",
                        retry_after_secs = retry_after_secs
                    );
                    return Err(SessionError::RateLimited { retry_after_secs });
                }
            }
        }

        let token = self
            .auth
            .send_challenge(&phone)
            .await
            .map_err(|e| SessionError::from_send(e, raw_phone))?;

        let now = self.time.now();
        {
            let mut inner = self.inner.write();
            inner.state = SessionState::ChallengeSent(PendingChallenge {
                token: token.clone(),
                phone: phone.clone(),
                issued_at: now,
                expires_at: now.saturating_add(self.config.challenge_ttl_ms()),
            });
            inner.resend.record(now);
        }

        log_event!(
            info,
            SUBSYSTEM,
            "Verification code sent",
            phone = %mask_phone(phone.as_str()),
            resend = resend
        );
        self.publisher
            .publish(SafeRideEvent::ChallengeSent {
                phone_suffix: phone.suffix().to_string(),
                resend,
            })
            .await;

        Ok(token)
    }

    fn discard_challenge(&self) {
        let mut inner = self.inner.write();
        if inner.state.kind() == StateKind::ChallengeSent {
            inner.state = SessionState::Unauthenticated;
        }
    }
}

#[async_trait]
impl<A: AuthGateway + 'static, P: ProfileStore + 'static> SessionApi for SessionService<A, P> {
    async fn request_challenge(&self, phone: &str) -> SessionResult<ChallengeToken> {
        self.send_challenge(phone, false).await
    }

    async fn resend_challenge(&self, phone: &str) -> SessionResult<ChallengeToken> {
        self.send_challenge(phone, true).await
    }

    /// On success the identity is cached first and then handed to the
    /// profile store. A failed save is logged and does not undo the sign-in,
    /// unlike profile and contact updates where persistence errors propagate.
    async fn verify_challenge(
        &self,
        token: &ChallengeToken,
        code: &str,
    ) -> SessionResult<Identity> {
        let code = VerificationCode::parse(code)?;
        let _flight = self.begin()?;

        let challenge = self
            .inner
            .read()
            .state
            .challenge()
            .cloned()
            .filter(|c| &c.token == token)
            .ok_or(SessionError::UnknownChallenge)?;

        if challenge.is_expired(self.time.now()) {
            self.discard_challenge();
            log_event!(info, SUBSYSTEM, "Challenge expired before verification");
            return Err(SessionError::ChallengeExpired);
        }

        let mut identity = match self.auth.verify_challenge(token, &code).await {
            Ok(identity) => identity,
            Err(e) => {
                let err = SessionError::from_verify(e);
                match &err {
                    SessionError::ChallengeExpired => self.discard_challenge(),
                    SessionError::VerificationFailed(_) => {
                        self.publisher
                            .publish(SafeRideEvent::VerificationRejected)
                            .await;
                    }
                    _ => {}
                }
                log_event!(warn, SUBSYSTEM, "Verification failed", error = %err);
                return Err(err);
            }
        };
        identity.is_verified = true;

        {
            let mut inner = self.inner.write();
            inner.state = SessionState::Authenticated(identity.clone());
            inner.resend.reset();
        }

        if let Err(e) = self.profiles.save_identity(&identity).await {
            log_event!(
                warn,
                SUBSYSTEM,
                "Profile save failed after sign-in; continuing",
                uid = %identity.uid,
                error = %e
            );
        }

        log_event!(info, SUBSYSTEM, "Session established", uid = %identity.uid);
        self.publisher
            .publish(SafeRideEvent::SessionEstablished {
                uid: identity.uid.clone(),
            })
            .await;

        Ok(identity)
    }

    fn abandon_challenge(&self) -> SessionResult<()> {
        let _flight = self.begin()?;
        self.discard_challenge();
        self.inner.write().resend.reset();
        Ok(())
    }

    async fn update_profile(&self, update: ProfileUpdate) -> SessionResult<Identity> {
        let _flight = self.begin()?;
        let current = self.require_identity()?;

        if let Some(name) = &update.display_name {
            validate_display_name(name)?;
        }
        if let Some(email) = &update.email {
            validate_email(email)?;
        }
        if update.is_empty() {
            return Ok(current);
        }

        let updated = self.auth.update_profile(&current.uid, &update).await?;
        self.profiles.update_identity(&updated).await?;

        {
            let mut inner = self.inner.write();
            if let SessionState::Authenticated(identity) = &mut inner.state {
                *identity = updated.clone();
            }
        }

        log_event!(info, SUBSYSTEM, "Profile updated", uid = %updated.uid);
        self.publisher
            .publish(SafeRideEvent::ProfileUpdated {
                uid: updated.uid.clone(),
            })
            .await;

        Ok(updated)
    }

    async fn add_emergency_contact(
        &self,
        contact: NewEmergencyContact,
    ) -> SessionResult<EmergencyContact> {
        let _flight = self.begin()?;
        let current = self.require_identity()?;

        if contact.name.trim().is_empty() {
            return Err(SessionError::InvalidContact(
                "name must not be empty".to_string(),
            ));
        }
        let phone = PhoneNumber::parse(&contact.phone_number, &self.config.country_code)
            .map_err(|_| {
                SessionError::InvalidContact(format!("invalid phone number: {}", contact.phone_number))
            })?;
        if current.emergency_contacts.len() >= self.config.max_contacts {
            return Err(SessionError::InvalidContact(format!(
                "at most {} emergency contacts allowed",
                self.config.max_contacts
            )));
        }

        let now = self.time.now();
        let contact = contact.into_contact(ContactId::generate(), &phone, now);
        let mut contacts = current.emergency_contacts.clone();
        contacts.push(contact.clone());

        self.profiles
            .update_contacts(&current.uid, &contacts)
            .await?;

        {
            let mut inner = self.inner.write();
            if let SessionState::Authenticated(identity) = &mut inner.state {
                identity.emergency_contacts = contacts;
                identity.updated_at = now;
            }
        }

        log_event!(
            info,
            SUBSYSTEM,
            "Emergency contact added",
            uid = %current.uid,
            contact_id = %contact.id
        );
        self.publisher
            .publish(SafeRideEvent::ProfileUpdated {
                uid: current.uid.clone(),
            })
            .await;

        Ok(contact)
    }

    async fn sign_out(&self) -> SessionResult<()> {
        let _flight = self.begin()?;

        let (kind, uid) = {
            let inner = self.inner.read();
            (
                inner.state.kind(),
                inner.state.identity().map(|i| i.uid.clone()),
            )
        };

        let uid = match (kind, uid) {
            (StateKind::Authenticated, Some(uid)) => uid,
            (StateKind::ChallengeSent, _) => {
                self.discard_challenge();
                return Ok(());
            }
            _ => return Ok(()),
        };

        self.auth.sign_out().await?;

        {
            let mut inner = self.inner.write();
            inner.state = SessionState::Unauthenticated;
            inner.resend.reset();
        }

        log_event!(info, SUBSYSTEM, "Signed out", uid = %uid);
        self.publisher
            .publish(SafeRideEvent::SessionEnded { uid })
            .await;

        Ok(())
    }

    fn state_kind(&self) -> StateKind {
        self.inner.read().state.kind()
    }

    fn identity(&self) -> Option<Identity> {
        self.inner.read().state.identity().cloned()
    }

    fn is_authenticated(&self) -> bool {
        self.state_kind() == StateKind::Authenticated
    }

    fn pending_challenge(&self) -> Option<PendingChallenge> {
        self.inner.read().state.challenge().cloned()
    }

    fn resend_available_in(&self) -> Option<u64> {
        self.inner.read().resend.remaining_secs(self.time.now())
    }
}
