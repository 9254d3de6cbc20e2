//! Passive user notification port.

use chrono::{DateTime, Utc};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    /// Something succeeded.
    Info,
    /// Data was adjusted or partially loaded.
    Warning,
    /// A user action failed and was not applied.
    Failure,
}

/// A transient, non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Short headline.
    pub title: String,
    /// Explanatory text.
    pub detail: String,
    /// When the notification was raised.
    pub raised_at: DateTime<Utc>,
}

/// Sink for user notifications (toasts, log lines, test recorders).
pub trait Notifier: Send + Sync {
    /// Delivers a notification. Delivery never fails from the caller's view.
    fn notify(&self, notification: Notification);
}
