//! # Session Manager Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Owns the passenger's authentication lifecycle: phone verification by
//! one-time code, the authenticated identity, profile edits and the
//! emergency contact list.
//!
//! ## State Machine
//!
//! ```text
//! [Unauthenticated] ──request──→ [ChallengeSent] ──verify──→ [Authenticated]
//!        ↑                            │                            │
//!        └──── abandon / expiry ──────┘                            │
//!        └─────────────────────────── sign_out ────────────────────┘
//! ```
//!
//! There is no path from `Unauthenticated` to `Authenticated` that skips
//! a challenge.
//!
//! ## Domain Invariants
//!
//! | Rule | Enforcement Location |
//! |------|---------------------|
//! | Phone is `^[6-9]\d{9}$` after whitespace removal | `domain/invariants.rs` - `is_valid_local_mobile()` |
//! | Code is exactly six digits, checked before any backend call | `domain/value_objects.rs` - `VerificationCode::parse()` |
//! | Resend waits out the cooldown | `application/service.rs` - `send_challenge()` |
//! | Challenge expires after `challenge_ttl_secs` | `domain/entities.rs` - `PendingChallenge::is_expired()` |
//! | One outstanding backend call at a time | `shared_types::SingleFlight` |
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Purpose |
//! |-----------|-------|---------|
//! | Authentication backend | `AuthGateway` | Send/verify codes, sign out, profile edits |
//! | Profile persistence | `ProfileStore` | Store identity and contacts |
//! | Event bus | `shared_bus::EventPublisher` | Announce session changes |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  application/service.rs - SessionService                        │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - SessionApi trait                           │
//! │  ports/outbound.rs - AuthGateway, ProfileStore (+ mocks)        │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  domain/entities.rs      - SessionState, PendingChallenge       │
//! │  domain/value_objects.rs - PhoneNumber, VerificationCode        │
//! │  domain/invariants.rs    - validation rules                     │
//! │  domain/errors.rs        - SessionError                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::SessionService;
pub use config::SessionConfig;
pub use domain::{
    ChallengeToken, NewEmergencyContact, PendingChallenge, PhoneNumber, ProfileUpdate,
    SessionError, SessionResult, SessionState, StateKind, VerificationCode,
};
pub use ports::{AuthGateway, MockAuthGateway, MockProfileStore, ProfileStore, SessionApi};
