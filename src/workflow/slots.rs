//! Single-slot locks over the upload and extraction operations.
//!
//! Only one remote operation may be outstanding across the whole workbench.
//! A slot is claimed by returning a guard; dropping the guard always releases
//! the slot, so a panic or early return can never leave it held.
use super::WorkflowError;
use crate::delivery::ArtifactDescriptor;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// State of the extraction orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OperationStatus {
    #[default]
    Idle,
    InFlight,
    Succeeded {
        artifact: ArtifactDescriptor,
    },
    Failed {
        message: String,
    },
}

impl OperationStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::InFlight => write!(f, "in flight"),
            Self::Succeeded { artifact } => write!(
                f,
                "succeeded ({}, {} bytes)",
                artifact.path.display(),
                artifact.bytes
            ),
            Self::Failed { message } => write!(f, "failed ({message})"),
        }
    }
}

#[derive(Debug, Default)]
struct SlotState {
    uploading: bool,
    extraction: OperationStatus,
}

#[derive(Debug, Default)]
pub(crate) struct Slots {
    state: Mutex<SlotState>,
}

impl Slots {
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_idle(state: &SlotState) -> Result<(), WorkflowError> {
        if state.uploading {
            return Err(WorkflowError::UploadInProgress);
        }
        if state.extraction.is_in_flight() {
            return Err(WorkflowError::ExtractionInFlight);
        }
        Ok(())
    }

    pub(crate) fn claim_upload(&self) -> Result<UploadGuard<'_>, WorkflowError> {
        let mut state = self.lock();
        Self::ensure_idle(&state)?;
        state.uploading = true;
        Ok(UploadGuard { slots: self })
    }

    pub(crate) fn claim_extraction(&self) -> Result<ExtractionGuard<'_>, WorkflowError> {
        let mut state = self.lock();
        Self::ensure_idle(&state)?;
        let previous = std::mem::replace(&mut state.extraction, OperationStatus::InFlight);
        Ok(ExtractionGuard {
            slots: self,
            previous: Some(previous),
        })
    }

    pub(crate) fn uploading(&self) -> bool {
        self.lock().uploading
    }

    pub(crate) fn extraction_status(&self) -> OperationStatus {
        self.lock().extraction.clone()
    }
}

/// Held for the duration of one upload.
pub(crate) struct UploadGuard<'a> {
    slots: &'a Slots,
}

impl Drop for UploadGuard<'_> {
    fn drop(&mut self) {
        self.slots.lock().uploading = false;
    }
}

/// Held while one extraction is in flight.
///
/// `previous` is the status before the claim; `None` once the guard has
/// written its final status.
pub(crate) struct ExtractionGuard<'a> {
    slots: &'a Slots,
    previous: Option<OperationStatus>,
}

impl ExtractionGuard<'_> {
    /// Record the terminal status and release the slot.
    pub(crate) fn settle(mut self, status: OperationStatus) {
        self.slots.lock().extraction = status;
        self.previous = None;
    }

    /// Release the slot without sending anything; the status reverts to
    /// what it was before the claim.
    pub(crate) fn release(mut self) {
        if let Some(previous) = self.previous.take() {
            self.slots.lock().extraction = previous;
        }
    }
}

impl Drop for ExtractionGuard<'_> {
    fn drop(&mut self) {
        if self.previous.is_some() {
            self.slots.lock().extraction = OperationStatus::Failed {
                message: "extraction aborted".to_string(),
            };
        }
    }
}
