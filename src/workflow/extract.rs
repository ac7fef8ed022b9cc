//! Extraction orchestration: one request at a time, routed to delivery or
//! to the notification slot.
use super::slots::OperationStatus;
use super::{Workbench, WorkflowError};
use crate::delivery::{ArtifactDescriptor, ArtifactSink};
use crate::extraction::ExtractionKind;
use crate::notify::Notification;
use crate::remote::RemoteService;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// A required selection was empty; nothing was sent.
    Skipped,
    Delivered(ArtifactDescriptor),
    /// Carries the full failure description, including any server detail.
    Failed(String),
}

impl<R: RemoteService, S: ArtifactSink> Workbench<R, S> {
    /// Run one extraction against the active session.
    ///
    /// An empty required selection is a silent no-op that leaves the status
    /// as it was. Otherwise the status passes through `InFlight` and always
    /// settles on `Succeeded` or `Failed` before this returns.
    pub fn extract(&self, kind: ExtractionKind) -> Result<ExtractOutcome, WorkflowError> {
        // The slot is held before the store is read, so no upload can swap
        // the session between building the request and sending it.
        let guard = self.slots.claim_extraction().inspect_err(|err| {
            tracing::warn!(%kind, error = %err, "extraction rejected");
        })?;

        let request = {
            let store = self.store();
            store.current().map(|_| kind.request(&store))
        };
        let request = match request {
            None => {
                guard.release();
                return Err(WorkflowError::NoActiveSession);
            }
            Some(None) => {
                guard.release();
                tracing::debug!(%kind, "nothing selected; extraction skipped");
                return Ok(ExtractOutcome::Skipped);
            }
            Some(Some(request)) => request,
        };

        let start = Instant::now();
        tracing::info!(%kind, session_id = request.session_id(), "extraction start");
        let payload = match self.remote.extract(&request) {
            Ok(payload) => payload,
            Err(err) => {
                let message = err.describe();
                tracing::warn!(%kind, error = %message, "extraction failed");
                self.notifications
                    .set(Notification::error(kind.failure_text(&err)));
                guard.settle(OperationStatus::Failed {
                    message: message.clone(),
                });
                return Ok(ExtractOutcome::Failed(message));
            }
        };

        match self.sink.deliver(&payload, kind.filename()) {
            Ok(artifact) => {
                tracing::info!(
                    %kind,
                    bytes = artifact.bytes,
                    elapsed_ms = start.elapsed().as_millis(),
                    "extraction complete"
                );
                self.notifications
                    .set(Notification::success(kind.success_text()));
                guard.settle(OperationStatus::Succeeded {
                    artifact: artifact.clone(),
                });
                Ok(ExtractOutcome::Delivered(artifact))
            }
            Err(err) => {
                let message = format!("{err:#}");
                tracing::warn!(%kind, error = %message, "artifact delivery failed");
                self.notifications.set(Notification::error(format!(
                    "Could not save {}.",
                    kind.filename()
                )));
                guard.settle(OperationStatus::Failed {
                    message: message.clone(),
                });
                Ok(ExtractOutcome::Failed(message))
            }
        }
    }
}
