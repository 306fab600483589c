//! Short-lived user notifications.
//!
//! Only one toast is visible at a time; showing a new one replaces the old
//! one and restarts the timer. Expiry is evaluated when the state is read, so
//! no timer task has to be kept alive.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::ApiError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub shown_at: DateTime<Utc>,
}

#[derive(Debug)]
struct Slot {
    toast: Toast,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct ToastNotifier {
    duration: Duration,
    slot: Mutex<Option<Slot>>,
}

impl ToastNotifier {
    pub fn new(duration: Duration) -> Self {
        ToastNotifier {
            duration,
            slot: Mutex::new(None),
        }
    }

    pub fn show(&self, message: impl Into<String>, kind: ToastKind) {
        let toast = Toast {
            message: message.into(),
            kind,
            shown_at: Utc::now(),
        };
        debug!(kind = ?toast.kind, "Showing toast: {}", toast.message);
        *self.lock() = Some(Slot {
            toast,
            expires_at: Instant::now() + self.duration,
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Success);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Error);
    }

    /// Shows the category message for a failed request.
    pub fn notify_error(&self, err: &ApiError) {
        self.error(err.user_message());
    }

    /// The visible toast, if any.
    pub fn current(&self) -> Option<Toast> {
        let mut slot = self.lock();
        match slot.as_ref() {
            Some(s) if Instant::now() < s.expires_at => Some(s.toast.clone()),
            Some(_) => {
                *slot = None;
                None
            }
            None => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.current().is_some()
    }

    pub fn hide(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> MutexGuard<'_, Option<Slot>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
