//! In-process fakes shared by the unit tests.
use crate::delivery::{ArtifactDescriptor, ArtifactSink};
use crate::extraction::ExtractionRequest;
use crate::remote::{RemoteError, RemoteService, UploadFile};
use crate::session::Session;
use anyhow::anyhow;
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};

/// Scripted service that records every request it receives.
#[derive(Default)]
pub struct FakeRemote {
    pub upload_result: Mutex<Option<Result<Session, RemoteError>>>,
    pub extract_result: Mutex<Option<Result<Vec<u8>, RemoteError>>>,
    pub uploads: Mutex<Vec<String>>,
    pub requests: Mutex<Vec<ExtractionRequest>>,
    pub gate: Option<Gate>,
}

/// Lets a test hold an extraction open until it is released.
pub struct Gate {
    pub started: Mutex<mpsc::Sender<()>>,
    pub release: Mutex<mpsc::Receiver<()>>,
}

impl FakeRemote {
    pub fn uploading(result: Result<Session, RemoteError>) -> Self {
        let remote = Self::default();
        *remote.upload_result.lock().expect("lock") = Some(result);
        remote
    }

    pub fn answer_extractions(&self, result: Result<Vec<u8>, RemoteError>) {
        *self.extract_result.lock().expect("lock") = Some(result);
    }

    pub fn requests(&self) -> Vec<ExtractionRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

impl RemoteService for FakeRemote {
    fn upload(&self, file: &UploadFile) -> Result<Session, RemoteError> {
        self.uploads.lock().expect("lock").push(file.name.clone());
        self.upload_result
            .lock()
            .expect("lock")
            .clone()
            .unwrap_or_else(|| Err(RemoteError::Transport("no upload scripted".to_string())))
    }

    fn extract(&self, request: &ExtractionRequest) -> Result<Vec<u8>, RemoteError> {
        self.requests.lock().expect("lock").push(request.clone());
        if let Some(gate) = &self.gate {
            gate.started.lock().expect("lock").send(()).expect("signal start");
            gate.release.lock().expect("lock").recv().expect("await release");
        }
        self.extract_result
            .lock()
            .expect("lock")
            .clone()
            .unwrap_or_else(|| Ok(b"payload".to_vec()))
    }
}

/// Sink that records deliveries instead of touching the filesystem.
#[derive(Default)]
pub struct RecordingSink {
    pub deliveries: Mutex<Vec<(String, Vec<u8>)>>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn deliveries(&self) -> Vec<(String, Vec<u8>)> {
        self.deliveries.lock().expect("lock").clone()
    }
}

impl ArtifactSink for RecordingSink {
    fn deliver(&self, bytes: &[u8], filename: &str) -> anyhow::Result<ArtifactDescriptor> {
        if self.fail {
            return Err(anyhow!("disk full"));
        }
        self.deliveries
            .lock()
            .expect("lock")
            .push((filename.to_string(), bytes.to_vec()));
        Ok(ArtifactDescriptor {
            filename: filename.to_string(),
            path: PathBuf::from("/downloads").join(filename),
            bytes: bytes.len(),
        })
    }
}

pub fn session(id: &str) -> Session {
    Session {
        session_id: id.to_string(),
        filename: "dump.csv".to_string(),
        templates: vec!["T1".to_string(), "T2".to_string()],
        areas: vec!["North".to_string(), "South".to_string()],
        total_templates: 3,
        total_areas: 2,
    }
}

pub fn dump_file() -> UploadFile {
    UploadFile {
        name: "dump.csv".to_string(),
        bytes: b":TEMPLATE=$Motor\n".to_vec(),
    }
}
