//! # Single Flight
//!
//! At most one outstanding asynchronous operation per owner.
//!
//! A second caller does not wait; it is told immediately that the owner is
//! busy. The slot is released when the guard drops, including when the
//! operation returns early with an error.

use std::sync::atomic::{AtomicBool, Ordering};

/// Busy flag owned by a service.
#[derive(Debug, Default)]
pub struct SingleFlight {
    busy: AtomicBool,
}

impl SingleFlight {
    /// Create an idle slot.
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// Claim the slot, or `None` if another operation holds it.
    pub fn try_acquire(&self) -> Option<FlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard { slot: self })
    }

    /// Whether an operation currently holds the slot.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the slot on drop.
#[derive(Debug)]
pub struct FlightGuard<'a> {
    slot: &'a SingleFlight,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.slot.busy.store(false, Ordering::Release);
    }
}
