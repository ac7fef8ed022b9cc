//! HTTP client for the processing service.
//!
//! Uploads go out as a single-field multipart form and come back as JSON.
//! Extractions post a JSON body and read the binary response in full; a body
//! that ends early or exceeds the configured cap is a failure, never a
//! partial artifact.
use super::{RemoteError, RemoteService, UploadFile};
use crate::config::Settings;
use crate::extraction::ExtractionRequest;
use crate::session::Session;
use serde::Deserialize;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use ureq::http::{Response, StatusCode};
use ureq::{Agent, Body};

const UPLOAD_ENDPOINT: &str = "upload";
const UPLOAD_FIELD: &str = "file";
/// Upload responses are small JSON summaries.
const MAX_SUMMARY_BYTES: u64 = 16 * 1024 * 1024;

/// `RemoteService` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpService {
    agent: Agent,
    base_url: String,
    max_artifact_bytes: u64,
}

impl HttpService {
    pub fn new(settings: &Settings) -> Self {
        // Status codes are inspected here so error bodies stay readable.
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(settings.timeout)
            .build()
            .into();
        Self {
            agent,
            base_url: settings.server_url.clone(),
            max_artifact_bytes: settings.max_artifact_bytes,
        }
    }

    fn url(&self, endpoint: &str) -> String {
        endpoint_url(&self.base_url, endpoint)
    }
}

impl RemoteService for HttpService {
    fn upload(&self, file: &UploadFile) -> Result<Session, RemoteError> {
        let url = self.url(UPLOAD_ENDPOINT);
        let boundary = multipart_boundary();
        let body = multipart_body(&boundary, UPLOAD_FIELD, &file.name, &file.bytes);
        let start = Instant::now();
        let response = self
            .agent
            .post(url.as_str())
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .send(body.as_slice())
            .map_err(transport_error)?;
        let bytes = read_success_body(response, MAX_SUMMARY_BYTES)?;
        tracing::debug!(
            %url,
            elapsed_ms = start.elapsed().as_millis(),
            response_bytes = bytes.len(),
            "upload response"
        );
        serde_json::from_slice(&bytes).map_err(|err| RemoteError::Decode(err.to_string()))
    }

    fn extract(&self, request: &ExtractionRequest) -> Result<Vec<u8>, RemoteError> {
        let url = self.url(request.endpoint());
        let start = Instant::now();
        let response = self
            .agent
            .post(url.as_str())
            .send_json(request)
            .map_err(transport_error)?;
        let bytes = read_success_body(response, self.max_artifact_bytes)?;
        tracing::debug!(
            kind = %request.kind(),
            %url,
            elapsed_ms = start.elapsed().as_millis(),
            response_bytes = bytes.len(),
            "extraction response"
        );
        Ok(bytes)
    }
}

fn transport_error(err: ureq::Error) -> RemoteError {
    match err {
        ureq::Error::StatusCode(status) => RemoteError::Status {
            status,
            reason: StatusCode::from_u16(status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .map(str::to_string),
            detail: None,
        },
        other => RemoteError::Transport(other.to_string()),
    }
}

/// Read the whole body, then classify by status.
fn read_success_body(mut response: Response<Body>, limit: u64) -> Result<Vec<u8>, RemoteError> {
    let status = response.status();
    let bytes = response
        .body_mut()
        .with_config()
        .limit(limit)
        .read_to_vec();
    if !status.is_success() {
        // An unreadable error body still reports the status.
        let detail = bytes.ok().and_then(|bytes| error_detail(&bytes));
        return Err(RemoteError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            detail,
        });
    }
    bytes.map_err(transport_error)
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Extract `detail` from a JSON error body. Only string details are surfaced.
fn error_detail(bytes: &[u8]) -> Option<String> {
    let body: ErrorBody = serde_json::from_slice(bytes).ok()?;
    match body.detail {
        serde_json::Value::String(text) if !text.trim().is_empty() => Some(text),
        _ => None,
    }
}

fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), endpoint)
}

fn multipart_boundary() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    format!("tagx-{:x}-{nanos:x}", std::process::id())
}

fn multipart_body(boundary: &str, field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let filename = filename.replace(['"', '\r', '\n'], "_");
    let head = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    );
    let tail = format!("\r\n--{boundary}--\r\n");
    let mut body = Vec::with_capacity(head.len() + bytes.len() + tail.len());
    body.extend_from_slice(head.as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(tail.as_bytes());
    body
}
