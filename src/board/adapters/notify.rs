//! Notifier that turns notifications into log events.

use crate::board::ports::{Notification, NotificationLevel, Notifier};
use tracing::{error, info, warn};

/// Emits every notification as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let Notification {
            level,
            title,
            detail,
            raised_at,
        } = notification;
        match level {
            NotificationLevel::Info => info!(%raised_at, %detail, "{title}"),
            NotificationLevel::Warning => warn!(%raised_at, %detail, "{title}"),
            NotificationLevel::Failure => error!(%raised_at, %detail, "{title}"),
        }
    }
}
