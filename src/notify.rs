//! Single-slot channel for the current user-facing status message.
use serde::Serialize;
use std::fmt;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
}

impl Notification {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

#[derive(Debug, Default)]
struct Slot {
    revision: u64,
    current: Option<Notification>,
}

/// Holds at most one notification. Every `set` replaces the previous value.
///
/// The revision counter lets readers tell a repeated message apart from one
/// they have already shown.
#[derive(Debug, Default)]
pub struct NotificationChannel {
    slot: Mutex<Slot>,
}

impl NotificationChannel {
    pub fn set(&self, notification: Notification) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.revision += 1;
        slot.current = Some(notification);
    }

    pub fn current(&self) -> Option<Notification> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    pub fn revision(&self) -> u64 {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_previous_notification() {
        let channel = NotificationChannel::default();
        assert!(channel.current().is_none());

        channel.set(Notification::error("Extraction failed."));
        channel.set(Notification::success("Areas extracted successfully."));

        let current = channel.current().expect("notification");
        assert_eq!(current.kind, NotificationKind::Success);
        assert_eq!(current.text, "Areas extracted successfully.");
        assert_eq!(channel.revision(), 2);
    }

    #[test]
    fn identical_messages_still_advance_revision() {
        let channel = NotificationChannel::default();
        channel.set(Notification::error("Extraction failed."));
        let first = channel.revision();
        channel.set(Notification::error("Extraction failed."));
        assert!(channel.revision() > first);
    }
}
