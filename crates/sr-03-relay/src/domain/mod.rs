//! # Domain Module
//!
//! Core domain types for the relays.

pub mod entities;
pub mod errors;
pub mod relay;

pub use entities::*;
pub use errors::*;
pub use relay::*;
