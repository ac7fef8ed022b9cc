//! Boundary to the remote processing service.
//!
//! The service parses uploads and produces every artifact; this side only
//! moves bytes and interprets success or failure.
mod http;

pub use http::HttpService;

use crate::extraction::ExtractionRequest;
use crate::session::Session;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// A named file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .with_context(|| format!("{} has no file name", path.display()))?;
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        Ok(Self { name, bytes })
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }
}

/// Failure of a remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The service answered with a non-success status.
    #[error("Request failed with status code {status}")]
    Status {
        status: u16,
        reason: Option<String>,
        detail: Option<String>,
    },
    /// The request never produced a complete response.
    #[error("{0}")]
    Transport(String),
    /// A success response whose body could not be interpreted.
    #[error("unreadable response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Server-provided `detail` message, when the error body carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    pub fn status_reason(&self) -> Option<&str> {
        match self {
            Self::Status { reason, .. } => reason.as_deref(),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// Server detail if present, else the transport message.
    pub fn user_message(&self) -> String {
        self.detail()
            .map(str::to_string)
            .unwrap_or_else(|| self.to_string())
    }

    /// Full description for logs and status records.
    pub fn describe(&self) -> String {
        match self.detail() {
            Some(detail) => format!("{self}: {detail}"),
            None => self.to_string(),
        }
    }
}

/// Operations the processing service offers.
pub trait RemoteService {
    /// Submit raw file bytes for parsing.
    fn upload(&self, file: &UploadFile) -> Result<Session, RemoteError>;

    /// Run one extraction and return the complete artifact payload.
    fn extract(&self, request: &ExtractionRequest) -> Result<Vec<u8>, RemoteError>;
}
