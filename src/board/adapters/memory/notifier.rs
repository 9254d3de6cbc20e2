//! Notifier that keeps every notification for later inspection.

use crate::board::ports::{Notification, NotificationLevel, Notifier};
use std::sync::{Arc, Mutex, PoisonError};

/// Thread-safe notifier recording what it is given.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    received: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    /// Creates a notifier with nothing recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every notification received, oldest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the notifications of one level, oldest first.
    #[must_use]
    pub fn at_level(&self, level: NotificationLevel) -> Vec<Notification> {
        self.notifications()
            .into_iter()
            .filter(|notification| notification.level == level)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
