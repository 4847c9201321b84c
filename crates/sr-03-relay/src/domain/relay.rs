//! # Ride-Scoped Relay
//!
//! Ordered entry sequences keyed by ride, each with an unread counter.
//!
//! The counter always equals the number of unread entries retained.
//! Entries from the local passenger are stored already read, so they
//! never count.

use shared_types::RideId;
use std::collections::{HashMap, VecDeque};

use super::entities::RelayEntry;

struct Thread<E> {
    entries: VecDeque<E>,
    unread: usize,
}

impl<E> Default for Thread<E> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
            unread: 0,
        }
    }
}

/// Per-ride ordered sequences with unread tracking.
pub struct RideScopedRelay<E: RelayEntry> {
    threads: HashMap<RideId, Thread<E>>,
    /// Entries kept per ride; 0 keeps all.
    capacity: usize,
}

impl<E: RelayEntry> RideScopedRelay<E> {
    /// Create a relay keeping at most `capacity` entries per ride.
    pub fn new(capacity: usize) -> Self {
        Self {
            threads: HashMap::new(),
            capacity,
        }
    }

    /// Append `entry` to the end of `ride_id`'s sequence.
    ///
    /// Returns how many older entries were evicted to make room.
    pub fn append(&mut self, ride_id: &RideId, mut entry: E) -> usize {
        if entry.origin().is_local() {
            entry.mark_read();
        }

        let thread = self.threads.entry(ride_id.clone()).or_default();
        if !entry.is_read() {
            thread.unread += 1;
        }
        thread.entries.push_back(entry);

        let mut evicted = 0;
        while self.capacity > 0 && thread.entries.len() > self.capacity {
            if let Some(oldest) = thread.entries.pop_front() {
                if !oldest.is_read() {
                    thread.unread = thread.unread.saturating_sub(1);
                }
                evicted += 1;
            }
        }
        evicted
    }

    /// Flag every entry for `ride_id` read. Returns how many changed.
    pub fn mark_read(&mut self, ride_id: &RideId) -> usize {
        let Some(thread) = self.threads.get_mut(ride_id) else {
            return 0;
        };
        let mut changed = 0;
        for entry in thread.entries.iter_mut().filter(|e| !e.is_read()) {
            entry.mark_read();
            changed += 1;
        }
        thread.unread = 0;
        changed
    }

    /// Drop the whole sequence for `ride_id`. Returns how many entries
    /// were discarded.
    pub fn clear(&mut self, ride_id: &RideId) -> usize {
        self.threads
            .remove(ride_id)
            .map(|t| t.entries.len())
            .unwrap_or(0)
    }

    /// Entries for `ride_id`, oldest first.
    pub fn entries(&self, ride_id: &RideId) -> impl Iterator<Item = &E> {
        self.threads
            .get(ride_id)
            .into_iter()
            .flat_map(|t| t.entries.iter())
    }

    /// Find an entry by id within `ride_id`.
    pub fn find(&self, ride_id: &RideId, id: &E::Id) -> Option<&E> {
        self.entries(ride_id).find(|e| e.id() == id)
    }

    /// Number of entries held for `ride_id`.
    pub fn len(&self, ride_id: &RideId) -> usize {
        self.threads.get(ride_id).map_or(0, |t| t.entries.len())
    }

    /// Whether nothing is held for any ride.
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Unread entries for `ride_id`.
    pub fn unread(&self, ride_id: &RideId) -> usize {
        self.threads.get(ride_id).map_or(0, |t| t.unread)
    }

    /// Unread entries across every ride.
    pub fn total_unread(&self) -> usize {
        self.threads.values().map(|t| t.unread).sum()
    }

    /// Rides with a sequence.
    pub fn rides(&self) -> impl Iterator<Item = &RideId> {
        self.threads.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ChatMessage, MessageId, Origin};
    use proptest::prelude::*;

    fn ride(id: &str) -> RideId {
        RideId(id.into())
    }

    fn message(ride_id: &str, origin: Origin) -> ChatMessage {
        ChatMessage {
            id: MessageId::generate(),
            ride_id: ride(ride_id),
            origin,
            body: "hi".into(),
            sent_at: 0,
            read: false,
        }
    }

    fn driver() -> Origin {
        Origin::Remote("driver".into())
    }

    #[test]
    fn test_remote_counts_local_does_not() {
        let mut relay = RideScopedRelay::new(0);
        relay.append(&ride("r1"), message("r1", driver()));
        relay.append(&ride("r1"), message("r1", Origin::Local));
        relay.append(&ride("r1"), message("r1", driver()));

        assert_eq!(relay.unread(&ride("r1")), 2);
        assert_eq!(relay.len(&ride("r1")), 3);
        assert!(relay.entries(&ride("r1")).nth(1).unwrap().is_read());
    }

    #[test]
    fn test_rides_are_independent() {
        let mut relay = RideScopedRelay::new(0);
        relay.append(&ride("r1"), message("r1", driver()));
        relay.append(&ride("r2"), message("r2", driver()));

        assert_eq!(relay.mark_read(&ride("r1")), 1);
        assert_eq!(relay.unread(&ride("r1")), 0);
        assert_eq!(relay.unread(&ride("r2")), 1);
        assert_eq!(relay.total_unread(), 1);

        assert_eq!(relay.clear(&ride("r2")), 1);
        assert_eq!(relay.len(&ride("r2")), 0);
        assert_eq!(relay.rides().count(), 1);
        assert_eq!(relay.clear(&ride("missing")), 0);
    }

    #[test]
    fn test_eviction_keeps_counter_honest() {
        let mut relay = RideScopedRelay::new(2);
        relay.append(&ride("r"), message("r", driver()));
        relay.append(&ride("r"), message("r", driver()));
        assert_eq!(relay.append(&ride("r"), message("r", Origin::Local)), 1);

        assert_eq!(relay.len(&ride("r")), 2);
        assert_eq!(relay.unread(&ride("r")), 1);
    }

    #[test]
    fn test_find_by_id() {
        let mut relay = RideScopedRelay::new(0);
        let msg = message("r", driver());
        let id = msg.id;
        relay.append(&ride("r"), msg);
        assert!(relay.find(&ride("r"), &id).is_some());
        assert!(relay.find(&ride("other"), &id).is_none());
    }

    proptest! {
        #[test]
        fn prop_unread_matches_entries(
            ops in prop::collection::vec(0u8..4, 0..60),
            capacity in 0usize..8,
        ) {
            let mut relay = RideScopedRelay::new(capacity);
            let r = ride("r");
            for op in ops {
                match op {
                    0 => { relay.append(&r, message("r", driver())); }
                    1 => { relay.append(&r, message("r", Origin::Local)); }
                    2 => { relay.mark_read(&r); }
                    _ => { relay.append(&r, message("r", Origin::Remote("support".into()))); }
                }
                let actual = relay.entries(&r).filter(|e| !e.is_read()).count();
                prop_assert_eq!(relay.unread(&r), actual);
                if capacity > 0 {
                    prop_assert!(relay.len(&r) <= capacity);
                }
            }
        }
    }
}
