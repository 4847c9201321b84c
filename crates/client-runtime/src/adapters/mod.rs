//! # Adapter Implementations
//!
//! Concrete adapters implementing one subsystem's outbound port on top of
//! another subsystem's inbound API.
//!
//! ```text
//! ┌──────────────────────┐   IdentityProvider    ┌──────────────────────┐
//! │  RideTrackingService │ ────────────────────→ │ SessionIdentityAdapter│
//! └──────────────────────┘                       └──────────┬───────────┘
//!                                                           │ SessionApi
//!                                                           ↓
//!                                                ┌──────────────────────┐
//!                                                │    SessionService    │
//!                                                └──────────────────────┘
//! ```

pub mod identity;

pub use identity::SessionIdentityAdapter;
