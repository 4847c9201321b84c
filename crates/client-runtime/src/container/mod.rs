//! # Client Container
//!
//! Configuration and the [`SafeRideClient`] composition root.
//!
//! - Subsystems never hold references to each other
//! - Cross-store effects travel over the event bus or through adapters
//!   implementing a subsystem's outbound port

pub mod client;
pub mod config;

pub use client::{Collaborators, MockClient, SafeRideClient};
pub use config::{ClientConfig, ConfigError};
