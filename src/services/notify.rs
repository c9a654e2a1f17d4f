//! Transient user-facing notifications
//!
//! The HTTP client reports every failure through a [`Notifier`] before
//! returning the error to its caller.

use chrono::{DateTime, Utc};
use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{error, info, warn};

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A transient message shown to the user
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// How long the message should stay visible
    pub duration: Duration,
    pub issued_at: DateTime<Utc>,
}

impl Notification {
    /// Error notification
    pub fn error(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            duration,
            issued_at: Utc::now(),
        }
    }

    /// Success notification
    pub fn success(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
            duration,
            issued_at: Utc::now(),
        }
    }
}

/// Sink for transient notifications
pub trait Notifier: Send + Sync + Debug {
    fn notify(&self, notification: Notification);
}

/// Notifier that writes to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => error!("{}", notification.message),
            NotificationLevel::Warning => warn!("{}", notification.message),
            NotificationLevel::Success | NotificationLevel::Info => {
                info!("{}", notification.message)
            }
        }
    }
}

/// Notifier that keeps every notification in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages received so far
    pub fn messages(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .map(|n| n.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
