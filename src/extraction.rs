//! Extraction kinds and the request bodies sent for them.
//!
//! Each kind has a fixed artifact filename and fixed notification text. The
//! filename never incorporates the uploaded file's name.
use crate::remote::RemoteError;
use crate::selection::SelectionKind;
use crate::session::SessionStore;
use serde::Serialize;
use std::fmt;

/// The five operations a session supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionKind {
    Templates,
    Areas,
    Matrix,
    Addresses { alarm_only: bool },
    Extensions,
}

impl ExtractionKind {
    pub fn filename(self) -> &'static str {
        match self {
            Self::Templates => "extracted_templates.csv",
            Self::Areas => "extracted_areas.csv",
            Self::Matrix => "plc_matrices.zip",
            Self::Addresses { alarm_only: false } => "Addresses_AllTags.zip",
            Self::Addresses { alarm_only: true } => "Addresses_AlarmOnly.zip",
            Self::Extensions => "extensions_report.csv",
        }
    }

    /// Selection that must be non-empty before a request is issued.
    pub fn required_selection(self) -> Option<SelectionKind> {
        match self {
            Self::Templates => Some(SelectionKind::Templates),
            Self::Areas => Some(SelectionKind::Areas),
            Self::Matrix | Self::Addresses { .. } | Self::Extensions => None,
        }
    }

    pub fn success_text(self) -> String {
        match self {
            Self::Templates => "Templates extracted successfully.".to_string(),
            Self::Areas => "Areas extracted successfully.".to_string(),
            Self::Matrix => "Matrices extracted successfully.".to_string(),
            Self::Addresses { alarm_only } => {
                format!("Addresses ({}) downloaded.", address_mode(alarm_only))
            }
            Self::Extensions => "Analysis report downloaded.".to_string(),
        }
    }

    /// Generic failure text. Server-provided detail is never included;
    /// only the address export names the HTTP reason phrase.
    pub fn failure_text(self, error: &RemoteError) -> String {
        match self {
            Self::Templates | Self::Areas | Self::Matrix => "Extraction failed.".to_string(),
            Self::Addresses { .. } => format!(
                "Extraction failed: {}",
                error.status_reason().unwrap_or("Server Error")
            ),
            Self::Extensions => "Analysis failed.".to_string(),
        }
    }

    /// Build the request for the active session, or `None` when a required
    /// selection is empty. Returns `None` as well when no session is active.
    pub fn request(self, store: &SessionStore) -> Option<ExtractionRequest> {
        let session_id = store.current()?.session_id.clone();
        let selected = |kind: SelectionKind| {
            let set = store.selection(kind);
            (!set.is_empty()).then(|| set.names().to_vec())
        };
        let request = match self {
            Self::Templates => ExtractionRequest::Templates {
                session_id,
                templates: selected(SelectionKind::Templates)?,
            },
            Self::Areas => ExtractionRequest::Areas {
                session_id,
                areas: selected(SelectionKind::Areas)?,
            },
            Self::Matrix => ExtractionRequest::Matrix { session_id },
            Self::Addresses { alarm_only } => ExtractionRequest::Addresses {
                session_id,
                alarm_only,
            },
            Self::Extensions => ExtractionRequest::Extensions { session_id },
        };
        Some(request)
    }
}

impl fmt::Display for ExtractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Templates => write!(f, "template extraction"),
            Self::Areas => write!(f, "area extraction"),
            Self::Matrix => write!(f, "matrix extraction"),
            Self::Addresses { alarm_only } => {
                write!(f, "address extraction ({})", address_mode(*alarm_only))
            }
            Self::Extensions => write!(f, "extension analysis"),
        }
    }
}

fn address_mode(alarm_only: bool) -> &'static str {
    if alarm_only {
        "AlarmOnly"
    } else {
        "AllTags"
    }
}

/// A single extraction call. Built, sent, and dropped; never queued.
///
/// Serializes to exactly the JSON body the endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExtractionRequest {
    Templates {
        session_id: String,
        templates: Vec<String>,
    },
    Areas {
        session_id: String,
        areas: Vec<String>,
    },
    Matrix {
        session_id: String,
    },
    Addresses {
        session_id: String,
        alarm_only: bool,
    },
    Extensions {
        session_id: String,
    },
}

impl ExtractionRequest {
    pub fn kind(&self) -> ExtractionKind {
        match self {
            Self::Templates { .. } => ExtractionKind::Templates,
            Self::Areas { .. } => ExtractionKind::Areas,
            Self::Matrix { .. } => ExtractionKind::Matrix,
            Self::Addresses { alarm_only, .. } => ExtractionKind::Addresses {
                alarm_only: *alarm_only,
            },
            Self::Extensions { .. } => ExtractionKind::Extensions,
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            Self::Templates { session_id, .. }
            | Self::Areas { session_id, .. }
            | Self::Matrix { session_id }
            | Self::Addresses { session_id, .. }
            | Self::Extensions { session_id } => session_id,
        }
    }

    /// Endpoint path relative to the service base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Templates { .. } => "extract/template",
            Self::Areas { .. } => "extract/area",
            Self::Matrix { .. } => "extract/matrix",
            Self::Addresses { .. } => "extract/addresses",
            Self::Extensions { .. } => "analyze/extensions",
        }
    }
}
