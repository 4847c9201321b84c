//! # Outbound Ports
//!
//! Traits for the authentication backend and profile persistence, plus
//! scriptable mocks used by tests across the workspace.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{EmergencyContact, GatewayError, Identity, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::{ChallengeToken, PhoneNumber, ProfileUpdate, VerificationCode};

/// Authentication backend - outbound port.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Send a verification code to `phone`.
    async fn send_challenge(&self, phone: &PhoneNumber) -> Result<ChallengeToken, GatewayError>;

    /// Exchange a token and code for an identity.
    async fn verify_challenge(
        &self,
        token: &ChallengeToken,
        code: &VerificationCode,
    ) -> Result<Identity, GatewayError>;

    /// End the backend session.
    async fn sign_out(&self) -> Result<(), GatewayError>;

    /// Apply a profile patch and return the stored identity.
    async fn update_profile(
        &self,
        uid: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Identity, GatewayError>;
}

/// Profile persistence - outbound port.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Store the identity created by a successful verification.
    async fn save_identity(&self, identity: &Identity) -> Result<(), GatewayError>;

    /// Store an updated identity.
    async fn update_identity(&self, identity: &Identity) -> Result<(), GatewayError>;

    /// Replace the stored emergency contact list.
    async fn update_contacts(
        &self,
        uid: &UserId,
        contacts: &[EmergencyContact],
    ) -> Result<(), GatewayError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

#[derive(Default)]
struct MockAuthState {
    send_failure: Option<GatewayError>,
    verify_failure: Option<GatewayError>,
    sign_out_failure: Option<GatewayError>,
    update_failure: Option<GatewayError>,
    accepted_code: Option<String>,
    issued: HashMap<String, String>,
    identities: HashMap<UserId, Identity>,
    next_token: u64,
}

/// Mock authentication backend.
///
/// Accepts any well-formed code unless `accept_only` is set. Failures are
/// switched on explicitly and stay on until cleared.
#[derive(Default)]
pub struct MockAuthGateway {
    state: Mutex<MockAuthState>,
    send_calls: AtomicUsize,
    verify_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl MockAuthGateway {
    /// Mock that accepts every code.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept `code`; anything else is `InvalidCode`.
    pub fn accept_only(&self, code: &str) {
        self.state.lock().accepted_code = Some(code.to_string());
    }

    /// Make `send_challenge` fail (or succeed again with `None`).
    pub fn fail_send(&self, err: Option<GatewayError>) {
        self.state.lock().send_failure = err;
    }

    /// Make `verify_challenge` fail.
    pub fn fail_verify(&self, err: Option<GatewayError>) {
        self.state.lock().verify_failure = err;
    }

    /// Make `sign_out` fail.
    pub fn fail_sign_out(&self, err: Option<GatewayError>) {
        self.state.lock().sign_out_failure = err;
    }

    /// Make `update_profile` fail.
    pub fn fail_update(&self, err: Option<GatewayError>) {
        self.state.lock().update_failure = err;
    }

    /// Number of `send_challenge` calls.
    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    /// Number of `verify_challenge` calls.
    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    /// Number of `sign_out` calls.
    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    /// Number of `update_profile` calls.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthGateway for MockAuthGateway {
    async fn send_challenge(&self, phone: &PhoneNumber) -> Result<ChallengeToken, GatewayError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        if let Some(err) = state.send_failure.clone() {
            return Err(err);
        }
        state.next_token += 1;
        let token = format!("challenge-{}", state.next_token);
        state.issued.insert(token.clone(), phone.as_str().to_string());
        Ok(ChallengeToken(token))
    }

    async fn verify_challenge(
        &self,
        token: &ChallengeToken,
        code: &VerificationCode,
    ) -> Result<Identity, GatewayError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        if let Some(err) = state.verify_failure.clone() {
            return Err(err);
        }
        if let Some(expected) = &state.accepted_code {
            if expected != code.as_str() {
                return Err(GatewayError::InvalidCode);
            }
        }
        let phone = state
            .issued
            .get(&token.0)
            .cloned()
            .ok_or_else(|| GatewayError::Rejected("unknown token".to_string()))?;
        let uid = UserId(format!("user-{}", &phone[phone.len().saturating_sub(10)..]));
        let identity = state
            .identities
            .entry(uid.clone())
            .or_insert_with(|| Identity::new_verified(uid, phone, 0))
            .clone();
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), GatewayError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        match self.state.lock().sign_out_failure.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn update_profile(
        &self,
        uid: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Identity, GatewayError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        if let Some(err) = state.update_failure.clone() {
            return Err(err);
        }
        let current = state
            .identities
            .get(uid)
            .cloned()
            .ok_or_else(|| GatewayError::Rejected(format!("unknown user {uid}")))?;
        let updated = update.applied_to(&current, current.updated_at + 1);
        state.identities.insert(uid.clone(), updated.clone());
        Ok(updated)
    }
}

#[derive(Default)]
struct MockProfileState {
    save_failure: Option<GatewayError>,
    update_failure: Option<GatewayError>,
    contacts_failure: Option<GatewayError>,
    identities: HashMap<UserId, Identity>,
    contacts: HashMap<UserId, Vec<EmergencyContact>>,
}

/// Mock profile persistence that keeps records in memory.
#[derive(Default)]
pub struct MockProfileStore {
    state: Mutex<MockProfileState>,
    save_calls: AtomicUsize,
    update_calls: AtomicUsize,
    contacts_calls: AtomicUsize,
}

impl MockProfileStore {
    /// Empty store with no failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `save_identity` fail.
    pub fn fail_save(&self, err: Option<GatewayError>) {
        self.state.lock().save_failure = err;
    }

    /// Make `update_identity` fail.
    pub fn fail_update(&self, err: Option<GatewayError>) {
        self.state.lock().update_failure = err;
    }

    /// Make `update_contacts` fail.
    pub fn fail_contacts(&self, err: Option<GatewayError>) {
        self.state.lock().contacts_failure = err;
    }

    /// Stored identity for `uid`.
    pub fn stored_identity(&self, uid: &UserId) -> Option<Identity> {
        self.state.lock().identities.get(uid).cloned()
    }

    /// Stored contact list for `uid`.
    pub fn stored_contacts(&self, uid: &UserId) -> Vec<EmergencyContact> {
        self.state
            .lock()
            .contacts
            .get(uid)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of `save_identity` calls.
    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    /// Number of `update_identity` calls.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Number of `update_contacts` calls.
    pub fn contacts_calls(&self) -> usize {
        self.contacts_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for MockProfileStore {
    async fn save_identity(&self, identity: &Identity) -> Result<(), GatewayError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        if let Some(err) = state.save_failure.clone() {
            return Err(err);
        }
        state
            .identities
            .insert(identity.uid.clone(), identity.clone());
        Ok(())
    }

    async fn update_identity(&self, identity: &Identity) -> Result<(), GatewayError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        if let Some(err) = state.update_failure.clone() {
            return Err(err);
        }
        state
            .identities
            .insert(identity.uid.clone(), identity.clone());
        Ok(())
    }

    async fn update_contacts(
        &self,
        uid: &UserId,
        contacts: &[EmergencyContact],
    ) -> Result<(), GatewayError> {
        self.contacts_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        if let Some(err) = state.contacts_failure.clone() {
            return Err(err);
        }
        state.contacts.insert(uid.clone(), contacts.to_vec());
        Ok(())
    }
}
