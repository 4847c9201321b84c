//! # SafeRide Client Runtime
//!
//! Wires the session, ride-tracking and relay subsystems into one
//! passenger client. The `saferide-demo` binary drives it against mocks.
//!
//! ## Architectural Patterns
//!
//! - **Event-Driven**: subsystems publish facts on the bus; the router reacts
//! - **Hexagonal Architecture**: ports define contracts, adapters implement them
//! - **Injected Collaborators**: every backend and the clock come in through
//!   [`Collaborators`]
//!
//! ## Subsystems
//!
//! | Id | Crate | Owns |
//! |----|-------|------|
//! | 1 | `sr-01-session` | Phone verification, identity, emergency contacts |
//! | 2 | `sr-02-ride-tracking` | Booking, ride lifecycle, payment status, SOS |
//! | 3 | `sr-03-relay` | Ride chat and notifications |

#![warn(missing_docs)]
#![allow(missing_docs)]
#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod container;
pub mod errors;
pub mod wiring;

pub use container::{ClientConfig, Collaborators, ConfigError, MockClient, SafeRideClient};
pub use errors::{ClientError, ClientResult, ErrorKind};
pub use wiring::EventRouter;
