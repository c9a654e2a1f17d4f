//! Service layer module
//!
//! Contains the HTTP client wrapper and the notification sink

pub mod client;
pub mod notify;

pub use client::{ApiClient, RequestOptions};
pub use notify::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier};
