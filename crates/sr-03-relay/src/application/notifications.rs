//! # Notification Relay
//!
//! Passenger notifications, newest first. A notification is either about
//! one ride or account-wide.

use saferide_telemetry::log_event;
use shared_types::{RideId, TimeSource};
use std::collections::VecDeque;
use std::sync::Arc;

use crate::config::RelayConfig;
use crate::domain::{Notification, NotificationId, NotificationKind, RelayError, RelayResult};

const SUBSYSTEM: &str = "relay";

/// Newest-first notification store with an unread counter.
pub struct NotificationRelay {
    notifications: VecDeque<Notification>,
    unread: usize,
    capacity: usize,
    time: Arc<dyn TimeSource>,
}

impl NotificationRelay {
    /// Create an empty relay.
    pub fn new(config: &RelayConfig, time: Arc<dyn TimeSource>) -> Self {
        Self {
            notifications: VecDeque::new(),
            unread: 0,
            capacity: config.max_notifications,
            time,
        }
    }

    /// Add a notification at the front.
    pub fn push(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        ride_id: Option<RideId>,
    ) -> Notification {
        let notification = Notification {
            id: NotificationId::generate(),
            kind,
            title: title.into(),
            body: body.into(),
            ride_id,
            received_at: self.time.now(),
            read: false,
        };
        self.notifications.push_front(notification.clone());
        self.unread += 1;

        while self.capacity > 0 && self.notifications.len() > self.capacity {
            if let Some(oldest) = self.notifications.pop_back() {
                if !oldest.read {
                    self.unread = self.unread.saturating_sub(1);
                }
            }
        }

        log_event!(
            debug,
            SUBSYSTEM,
            "Notification received",
            notification_id = %notification.id,
            unread = self.unread
        );
        notification
    }

    /// Mark one notification read.
    pub fn mark_read(&mut self, id: &NotificationId) -> RelayResult<()> {
        let notification = self
            .notifications
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or(RelayError::UnknownNotification(*id))?;
        if !notification.read {
            notification.read = true;
            self.unread = self.unread.saturating_sub(1);
        }
        Ok(())
    }

    /// Mark everything read.
    pub fn mark_all_read(&mut self) {
        for notification in self.notifications.iter_mut() {
            notification.read = true;
        }
        self.unread = 0;
    }

    /// Drop the notifications about `ride_id`. Returns how many went.
    pub fn clear_ride(&mut self, ride_id: &RideId) -> usize {
        self.remove_where(|n| n.ride_id.as_ref() == Some(ride_id))
    }

    /// Drop every account-wide notification. Returns how many went.
    pub fn clear_global(&mut self) -> usize {
        self.remove_where(|n| !n.is_ride_scoped())
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.notifications.clear();
        self.unread = 0;
    }

    fn remove_where(&mut self, pred: impl Fn(&Notification) -> bool) -> usize {
        let before = self.notifications.len();
        let mut unread_removed = 0;
        self.notifications.retain(|n| {
            let remove = pred(n);
            if remove && !n.read {
                unread_removed += 1;
            }
            !remove
        });
        self.unread = self.unread.saturating_sub(unread_removed);
        before - self.notifications.len()
    }

    /// All notifications, newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.iter().cloned().collect()
    }

    /// Notifications about `ride_id`, newest first.
    pub fn for_ride(&self, ride_id: &RideId) -> Vec<Notification> {
        self.notifications
            .iter()
            .filter(|n| n.ride_id.as_ref() == Some(ride_id))
            .cloned()
            .collect()
    }

    /// Unread count.
    pub fn unread(&self) -> usize {
        self.unread
    }

    /// Number of notifications held.
    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}
