//! Session store for the single active upload.
//!
//! A session is the service's summary of one uploaded dataset. It is never
//! edited in place: a new upload replaces it and reset drops it. Either way
//! both selection sets are cleared so they never outlive the names they were
//! drawn from.
use crate::selection::{SelectionKind, SelectionSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Server-parsed summary of one uploaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque identifier issued by the service; passed back verbatim.
    pub session_id: String,
    pub filename: String,
    #[serde(default)]
    pub templates: Vec<String>,
    #[serde(default)]
    pub areas: Vec<String>,
    pub total_templates: u64,
    pub total_areas: u64,
}

impl Session {
    pub fn names(&self, kind: SelectionKind) -> &[String] {
        match kind {
            SelectionKind::Templates => &self.templates,
            SelectionKind::Areas => &self.areas,
        }
    }

    pub fn lists(&self, kind: SelectionKind, name: &str) -> bool {
        self.names(kind).iter().any(|candidate| candidate == name)
    }
}

/// Holds the active session and the selections made against it.
#[derive(Debug, Default)]
pub struct SessionStore {
    session: Option<Arc<Session>>,
    templates: SelectionSet,
    areas: SelectionSet,
}

impl SessionStore {
    pub fn current(&self) -> Option<Arc<Session>> {
        self.session.clone()
    }

    /// Install a freshly uploaded session, discarding the previous one.
    pub fn replace(&mut self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        self.session = Some(Arc::clone(&session));
        self.clear_selections();
        session
    }

    pub fn reset(&mut self) {
        self.session = None;
        self.clear_selections();
    }

    pub fn selection(&self, kind: SelectionKind) -> &SelectionSet {
        match kind {
            SelectionKind::Templates => &self.templates,
            SelectionKind::Areas => &self.areas,
        }
    }

    pub fn selection_mut(&mut self, kind: SelectionKind) -> &mut SelectionSet {
        match kind {
            SelectionKind::Templates => &mut self.templates,
            SelectionKind::Areas => &mut self.areas,
        }
    }

    fn clear_selections(&mut self) {
        self.templates.clear();
        self.areas.clear();
    }
}
