//! Extraction session workflow.
//!
//! The `Workbench` owns the session store, the selection sets, the
//! notification slot and the operation locks. Upload and extraction run
//! through it; every remote failure is converted to a notification here and
//! goes no further.
mod extract;
mod slots;
mod upload;

pub use extract::ExtractOutcome;
pub use slots::OperationStatus;
pub use upload::UploadOutcome;

use crate::notify::{Notification, NotificationChannel};
use crate::selection::{SelectionKind, SelectionSet};
use crate::session::{Session, SessionStore};
use slots::Slots;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Caller errors: operations the workbench refuses to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("no active session; upload a file first")]
    NoActiveSession,
    #[error("an upload is already in progress")]
    UploadInProgress,
    #[error("an extraction is already in flight")]
    ExtractionInFlight,
}

/// One client session against the processing service.
pub struct Workbench<R, S> {
    remote: R,
    sink: S,
    store: Mutex<SessionStore>,
    slots: Slots,
    notifications: NotificationChannel,
}

impl<R, S> Workbench<R, S> {
    pub fn new(remote: R, sink: S) -> Self {
        Self {
            remote,
            sink,
            store: Mutex::new(SessionStore::default()),
            slots: Slots::default(),
            notifications: NotificationChannel::default(),
        }
    }

    fn store(&self) -> MutexGuard<'_, SessionStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session(&self) -> Option<Arc<Session>> {
        self.store().current()
    }

    /// Drop the active session and both selections.
    pub fn reset(&self) {
        self.store().reset();
        tracing::info!("session reset");
    }

    /// Flip `name` in the chosen selection; returns the new membership.
    pub fn toggle(&self, kind: SelectionKind, name: &str) -> bool {
        let mut store = self.store();
        if let Some(session) = store.current() {
            if !session.lists(kind, name) {
                tracing::warn!(%kind, name, "selected name is not listed in the session");
            }
        }
        store.selection_mut(kind).toggle(name)
    }

    pub fn clear_selection(&self, kind: SelectionKind) {
        self.store().selection_mut(kind).clear();
    }

    pub fn selection(&self, kind: SelectionKind) -> SelectionSet {
        self.store().selection(kind).clone()
    }

    pub fn status(&self) -> OperationStatus {
        self.slots.extraction_status()
    }

    pub fn is_uploading(&self) -> bool {
        self.slots.uploading()
    }

    pub fn notification(&self) -> Option<Notification> {
        self.notifications.current()
    }

    pub fn notifications(&self) -> &NotificationChannel {
        &self.notifications
    }

    #[cfg(test)]
    pub(crate) fn remote(&self) -> &R {
        &self.remote
    }

    #[cfg(test)]
    pub(crate) fn sink(&self) -> &S {
        &self.sink
    }
}
