//! Shared test infrastructure for integration tests.
//!
//! `MockService` is a loopback `tiny_http` server that answers each request
//! with the next scripted reply and records what the client sent.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tempfile::TempDir;
use tiny_http::{Header, Response, Server, StatusCode};

/// One request as the server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

/// A canned response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string().into_bytes(),
        }
    }

    pub fn bytes(body: &[u8]) -> Self {
        Self {
            status: 200,
            content_type: "application/octet-stream",
            body: body.to_vec(),
        }
    }

    fn into_response(self) -> Response<std::io::Cursor<Vec<u8>>> {
        let content_type = Header::from_bytes("Content-Type", self.content_type)
            .expect("content type header");
        Response::from_data(self.body)
            .with_status_code(StatusCode(self.status))
            .with_header(content_type)
    }
}

pub struct MockService {
    pub base_url: String,
    server: Arc<Server>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: Option<JoinHandle<()>>,
}

impl MockService {
    /// Answer requests with `replies` in order, then stop serving.
    pub fn start(replies: Vec<Reply>) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("http server"));
        let base_url = format!("http://{}/api", server.server_addr());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let serving = Arc::clone(&server);
        let recorded = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            for reply in replies {
                let Ok(mut request) = serving.recv() else {
                    return;
                };
                let mut body = Vec::new();
                if request.as_reader().read_to_end(&mut body).is_err() {
                    return;
                }
                // Recorded before answering so the client never sees a
                // response for a request the test cannot observe yet.
                recorded.lock().expect("lock").push(RecordedRequest {
                    method: request.method().to_string(),
                    path: request.url().to_string(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|header| (header.field.to_string(), header.value.to_string()))
                        .collect(),
                    body,
                });
                let _ = request.respond(reply.into_response());
            }
        });

        Self {
            base_url,
            server,
            requests,
            handle: Some(handle),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Isolated run of the `tagx` binary: its own config home and output dir.
pub struct CliRun {
    pub home: TempDir,
}

impl CliRun {
    pub fn isolated() -> Self {
        Self {
            home: TempDir::new().expect("tempdir"),
        }
    }

    pub fn out_dir(&self) -> PathBuf {
        self.home.path().join("downloads")
    }

    /// Write a small export file to upload.
    pub fn export(&self, name: &str) -> PathBuf {
        let path = self.home.path().join(name);
        std::fs::write(&path, ":TEMPLATE=$Motor\nTag,Area\n").expect("write export");
        path
    }

    pub fn run(&self, server: &MockService, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_tagx"))
            .arg("--server")
            .arg(&server.base_url)
            .arg("--out-dir")
            .arg(self.out_dir())
            .args(args)
            .env("XDG_CONFIG_HOME", self.home.path().join("config"))
            .env("HOME", self.home.path())
            .env_remove("TAGX_SERVER_URL")
            .env_remove("TAGX_OUTPUT_DIR")
            .env_remove("TAGX_LOG")
            .output()
            .expect("run tagx")
    }

    pub fn read_artifact(&self, filename: &str) -> Vec<u8> {
        std::fs::read(self.out_dir().join(filename)).expect("artifact written")
    }

    pub fn has_artifact(&self, filename: &str) -> bool {
        self.out_dir().join(filename).exists()
    }
}

/// Upload response for a session named `id`.
pub fn session_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "session_id": id,
        "filename": "plant.csv",
        "templates": ["T1", "T2"],
        "areas": ["North"],
        "total_templates": 2,
        "total_areas": 1
    })
}
