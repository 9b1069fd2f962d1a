//! User-facing notifications.
//!
//! Notifications are fire-and-forget: the tracker never waits on or inspects
//! the result of delivering one.

use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Informational message.
    Info,
    /// Something the user should act on.
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Info => f.write_str("info"),
            NotificationKind::Error => f.write_str("error"),
        }
    }
}

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync {
    /// Delivers a notification.
    fn notify(&self, kind: NotificationKind, title: &str, message: &str);
}

/// Notifier that writes to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: NotificationKind, title: &str, message: &str) {
        match kind {
            NotificationKind::Info => info!(title, message, "Notification"),
            NotificationKind::Error => error!(title, message, "Notification"),
        }
    }
}

/// Notifier that forwards to several others.
#[derive(Default, Clone)]
pub struct MultiNotifier {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl MultiNotifier {
    /// Creates an empty multi-notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a notifier.
    #[must_use]
    pub fn with(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Number of wrapped notifiers.
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Whether no notifier is wrapped.
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Notifier for MultiNotifier {
    fn notify(&self, kind: NotificationKind, title: &str, message: &str) {
        for notifier in &self.notifiers {
            notifier.notify(kind, title, message);
        }
    }
}
