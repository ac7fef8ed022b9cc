//! End-to-end runs of `tagx` against a loopback service.

mod common;

use common::{session_json, CliRun, MockService, Reply};
use serde_json::json;

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn template_extraction_uploads_then_saves_artifact() {
    let server = MockService::start(vec![
        Reply::json(200, session_json("S")),
        Reply::bytes(b"Tag,Template\nM1,T1\n"),
    ]);
    let cli = CliRun::isolated();
    let export = cli.export("plant.csv");

    let output = cli.run(
        &server,
        &[
            "extract",
            export.to_str().expect("utf8 path"),
            "templates",
            "--name",
            "T1",
        ],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Templates extracted successfully."));
    assert!(stdout(&output).contains("extracted_templates.csv"));
    assert_eq!(
        cli.read_artifact("extracted_templates.csv"),
        b"Tag,Template\nM1,T1\n"
    );

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    let upload = &requests[0];
    assert_eq!((upload.method.as_str(), upload.path.as_str()), ("POST", "/api/upload"));
    assert!(upload
        .header("content-type")
        .is_some_and(|value| value.starts_with("multipart/form-data; boundary=")));
    let upload_body = String::from_utf8_lossy(&upload.body);
    assert!(upload_body.contains("name=\"file\"; filename=\"plant.csv\""));
    assert!(upload_body.contains(":TEMPLATE=$Motor"));

    let extract = &requests[1];
    assert_eq!(extract.path, "/api/extract/template");
    assert_eq!(extract.json(), json!({"session_id": "S", "templates": ["T1"]}));
    let saved: Vec<_> = std::fs::read_dir(cli.out_dir())
        .expect("read out dir")
        .map(|entry| {
            let entry = entry.expect("dir entry");
            entry.file_name().to_string_lossy().into_owned()
        })
        .collect();
    assert_eq!(saved, ["extracted_templates.csv"]);
}

#[test]
fn rejected_upload_reports_server_detail() {
    let server = MockService::start(vec![Reply::json(400, json!({"detail": "bad format"}))]);
    let cli = CliRun::isolated();
    let export = cli.export("plant.csv");

    let output = cli.run(
        &server,
        &["extract", export.to_str().expect("utf8 path"), "matrix"],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Upload failed: bad format"));
    assert_eq!(server.requests().len(), 1);
    assert!(!cli.has_artifact("plc_matrices.zip"));
}

#[test]
fn alarm_only_addresses_use_their_own_filename() {
    let server = MockService::start(vec![
        Reply::json(200, session_json("S")),
        Reply::bytes(b"PK\x03\x04"),
    ]);
    let cli = CliRun::isolated();
    let export = cli.export("plant.zip");

    let output = cli.run(
        &server,
        &[
            "extract",
            export.to_str().expect("utf8 path"),
            "addresses",
            "--alarm-only",
        ],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Addresses (AlarmOnly) downloaded."));
    assert_eq!(cli.read_artifact("Addresses_AlarmOnly.zip"), b"PK\x03\x04");
    assert!(!cli.has_artifact("Addresses_AllTags.zip"));

    let requests = server.requests();
    assert_eq!(requests[1].path, "/api/extract/addresses");
    assert_eq!(
        requests[1].json(),
        json!({"session_id": "S", "alarm_only": true})
    );
}

#[test]
fn failed_matrix_extraction_writes_nothing() {
    let server = MockService::start(vec![
        Reply::json(200, session_json("S")),
        Reply::json(404, json!({"detail": "Session not found"})),
    ]);
    let cli = CliRun::isolated();
    let export = cli.export("plant.csv");

    let output = cli.run(
        &server,
        &["extract", export.to_str().expect("utf8 path"), "matrix"],
    );

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("error: Extraction failed."));
    assert!(!err.contains("Session not found"));
    assert!(!cli.has_artifact("plc_matrices.zip"));
    assert_eq!(server.requests()[1].json(), json!({"session_id": "S"}));
}

#[test]
fn empty_template_selection_sends_no_extraction() {
    let server = MockService::start(vec![Reply::json(200, session_json("S"))]);
    let cli = CliRun::isolated();
    let export = cli.export("plant.csv");

    let output = cli.run(
        &server,
        &["extract", export.to_str().expect("utf8 path"), "templates"],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Nothing selected"));
    assert_eq!(server.requests().len(), 1);
}

#[test]
fn inspect_prints_session_as_json() {
    let server = MockService::start(vec![Reply::json(200, session_json("abc"))]);
    let cli = CliRun::isolated();
    let export = cli.export("plant.csv");

    let output = cli.run(
        &server,
        &["inspect", export.to_str().expect("utf8 path"), "--json"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let session: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("session JSON on stdout");
    assert_eq!(session["session_id"], "abc");
    assert_eq!(session["templates"], json!(["T1", "T2"]));
    assert_eq!(session["total_areas"], 1);
}
