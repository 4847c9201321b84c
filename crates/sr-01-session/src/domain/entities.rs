//! # Domain Entities
//!
//! Session state machine and the requests that mutate the identity.
//!
//! ```text
//! [Unauthenticated] ──request──→ [ChallengeSent] ──verify──→ [Authenticated]
//!        ↑                          │    ↑  │                      │
//!        └──── abandon / expiry ────┘    └──┘ resend / rejected    │
//!        ↑                                                         │
//!        └──────────────────────── sign_out ───────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use shared_types::{ContactId, EmergencyContact, Identity, SavedAddress, Timestamp};

use super::value_objects::{ChallengeToken, PhoneNumber};

/// A verification code that has been sent and not yet consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChallenge {
    /// Backend token for the challenge.
    pub token: ChallengeToken,
    /// Number the code was sent to.
    pub phone: PhoneNumber,
    /// When the code was sent.
    pub issued_at: Timestamp,
    /// When the code stops being accepted.
    pub expires_at: Timestamp,
}

impl PendingChallenge {
    /// Whether the challenge is past its lifetime at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}

/// Authentication lifecycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// No identity and no challenge.
    #[default]
    Unauthenticated,
    /// A code was sent and awaits verification.
    ChallengeSent(PendingChallenge),
    /// Signed in.
    Authenticated(Identity),
}

impl SessionState {
    /// Discriminant without the payload.
    pub fn kind(&self) -> StateKind {
        match self {
            Self::Unauthenticated => StateKind::Unauthenticated,
            Self::ChallengeSent(_) => StateKind::ChallengeSent,
            Self::Authenticated(_) => StateKind::Authenticated,
        }
    }

    /// The signed-in identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    /// The pending challenge, if any.
    pub fn challenge(&self) -> Option<&PendingChallenge> {
        match self {
            Self::ChallengeSent(challenge) => Some(challenge),
            _ => None,
        }
    }
}

/// Session state without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    /// Signed out.
    Unauthenticated,
    /// Waiting for a code.
    ChallengeSent,
    /// Signed in.
    Authenticated,
}

/// Field-set patch for the profile. `None` leaves a field unchanged.
///
/// Applying the same patch twice yields the same identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// New display name.
    pub display_name: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New profile image URL.
    pub profile_image: Option<String>,
    /// Replacement list of saved addresses.
    pub saved_addresses: Option<Vec<SavedAddress>>,
}

impl ProfileUpdate {
    /// Patch that only sets the display name.
    pub fn display_name(name: impl Into<String>) -> Self {
        Self {
            display_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.email.is_none()
            && self.profile_image.is_none()
            && self.saved_addresses.is_none()
    }

    /// Apply the patch to a copy of `identity`.
    pub fn applied_to(&self, identity: &Identity, now: Timestamp) -> Identity {
        let mut updated = identity.clone();
        if let Some(name) = &self.display_name {
            updated.display_name = name.trim().to_string();
        }
        if let Some(email) = &self.email {
            updated.email = Some(email.trim().to_string());
        }
        if let Some(image) = &self.profile_image {
            updated.profile_image = Some(image.clone());
        }
        if let Some(addresses) = &self.saved_addresses {
            updated.saved_addresses = addresses.clone();
        }
        updated.updated_at = now;
        updated
    }
}

/// An emergency contact as entered by the passenger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmergencyContact {
    /// Contact name.
    pub name: String,
    /// Local mobile number, validated like a sign-in number.
    pub phone_number: String,
    /// Relationship label.
    pub relationship: String,
}

impl NewEmergencyContact {
    /// Build a contact request.
    pub fn new(
        name: impl Into<String>,
        phone_number: impl Into<String>,
        relationship: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone_number: phone_number.into(),
            relationship: relationship.into(),
        }
    }

    pub(crate) fn into_contact(
        self,
        id: ContactId,
        phone: &PhoneNumber,
        now: Timestamp,
    ) -> EmergencyContact {
        EmergencyContact {
            id,
            name: self.name.trim().to_string(),
            phone_number: phone.as_str().to_string(),
            relationship: self.relationship.trim().to_string(),
            added_at: now,
        }
    }
}
