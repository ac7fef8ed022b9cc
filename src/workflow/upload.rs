//! Upload orchestration.
use super::{Workbench, WorkflowError};
use crate::delivery::ArtifactSink;
use crate::notify::Notification;
use crate::remote::{RemoteError, RemoteService, UploadFile};
use crate::session::Session;
use std::sync::Arc;
use std::time::Instant;

/// Extensions the service accepts. Others are sent anyway.
const ACCEPTED_EXTENSIONS: &[&str] = &["csv", "zip"];
/// Above this size the service expects a zipped export.
const ZIP_HINT_BYTES: usize = 4_500_000;

pub const UPLOAD_SUCCESS_TEXT: &str = "File uploaded successfully!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The parsed session is now active.
    Installed(Arc<Session>),
    /// The previous session (if any) is still active.
    Failed(RemoteError),
}

impl<R: RemoteService, S: ArtifactSink> Workbench<R, S> {
    /// Send `file` to the service and install the resulting session.
    ///
    /// Rejected while any other operation is outstanding. Remote failures
    /// leave the store untouched and surface as an error notification.
    pub fn upload(&self, file: &UploadFile) -> Result<UploadOutcome, WorkflowError> {
        let _guard = self.slots.claim_upload()?;
        warn_on_advisory_limits(file);

        let start = Instant::now();
        tracing::info!(file = %file.name, bytes = file.bytes.len(), "upload start");
        match self.remote.upload(file) {
            Ok(session) => {
                let session = self.store().replace(session);
                tracing::info!(
                    session_id = %session.session_id,
                    templates = session.total_templates,
                    areas = session.total_areas,
                    elapsed_ms = start.elapsed().as_millis(),
                    "upload complete"
                );
                self.notifications
                    .set(Notification::success(UPLOAD_SUCCESS_TEXT));
                Ok(UploadOutcome::Installed(session))
            }
            Err(err) => {
                tracing::warn!(
                    file = %file.name,
                    error = %err.describe(),
                    elapsed_ms = start.elapsed().as_millis(),
                    "upload failed"
                );
                self.notifications.set(Notification::error(format!(
                    "Upload failed: {}",
                    err.user_message()
                )));
                Ok(UploadOutcome::Failed(err))
            }
        }
    }
}

fn warn_on_advisory_limits(file: &UploadFile) {
    let extension = file.extension();
    let accepted = extension
        .as_deref()
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext));
    if !accepted {
        tracing::warn!(file = %file.name, "expected a .csv or .zip export; uploading anyway");
    }
    if file.bytes.len() > ZIP_HINT_BYTES && extension.as_deref() != Some("zip") {
        tracing::warn!(
            file = %file.name,
            bytes = file.bytes.len(),
            "large exports should be zipped before upload"
        );
    }
}
