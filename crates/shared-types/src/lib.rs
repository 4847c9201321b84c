//! # Shared Types Crate
//!
//! This crate contains the domain entities and small infrastructure
//! primitives shared by every SafeRide subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Injected Time**: Every time-dependent rule reads a [`TimeSource`];
//!   nothing calls the system clock directly.
//! - **Collaborator Errors**: Backend adapters report failures as
//!   [`GatewayError`]; each subsystem maps them onto its own taxonomy.

pub mod cooldown;
pub mod entities;
pub mod errors;
pub mod single_flight;
pub mod time;

pub use cooldown::Cooldown;
pub use entities::*;
pub use errors::*;
pub use single_flight::{FlightGuard, SingleFlight};
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource, Timestamp};
