//! # Inbound Ports
//!
//! The API the client runtime drives the Session Manager through.

use async_trait::async_trait;
use shared_types::{EmergencyContact, Identity};

use crate::domain::{
    ChallengeToken, NewEmergencyContact, PendingChallenge, ProfileUpdate, SessionResult,
    StateKind,
};

/// Session Manager API - inbound port.
///
/// Async operations reach the authentication backend. Only one of them
/// may be outstanding at a time; an overlapping call fails with
/// `OperationInProgress` without touching state.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Validate `phone`, ask the backend to send a code, and remember the
    /// challenge. Starts the resend cooldown.
    ///
    /// While a code is pending this is rate limited like a resend; call
    /// `abandon_challenge` first to start over with another number.
    async fn request_challenge(&self, phone: &str) -> SessionResult<ChallengeToken>;

    /// Same as `request_challenge`, refused with `RateLimited` while the
    /// cooldown is running.
    async fn resend_challenge(&self, phone: &str) -> SessionResult<ChallengeToken>;

    /// Check `code` against the pending challenge identified by `token`.
    async fn verify_challenge(
        &self,
        token: &ChallengeToken,
        code: &str,
    ) -> SessionResult<Identity>;

    /// Drop a pending challenge (back navigation) and reset the resend
    /// cooldown. No-op on state otherwise.
    fn abandon_challenge(&self) -> SessionResult<()>;

    /// Patch profile fields on the backend and cache the result.
    async fn update_profile(&self, update: ProfileUpdate) -> SessionResult<Identity>;

    /// Append an emergency contact and persist the full list.
    async fn add_emergency_contact(
        &self,
        contact: NewEmergencyContact,
    ) -> SessionResult<EmergencyContact>;

    /// Clear the identity and any pending challenge. Idempotent.
    async fn sign_out(&self) -> SessionResult<()>;

    /// Current state without payload.
    fn state_kind(&self) -> StateKind;

    /// Snapshot of the signed-in identity.
    fn identity(&self) -> Option<Identity>;

    /// Whether a passenger is signed in.
    fn is_authenticated(&self) -> bool;

    /// Snapshot of the pending challenge.
    fn pending_challenge(&self) -> Option<PendingChallenge>;

    /// Seconds until a resend is allowed, `None` if allowed now.
    fn resend_available_in(&self) -> Option<u64>;
}
