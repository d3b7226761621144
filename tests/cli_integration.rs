// CLI integration tests for `intake decode`.
use std::io::Write;
use std::process::{Command, Stdio};

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_intake");
    Command::new(exe)
}

fn parse_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("valid json")
}

fn decode_stdin(args: &[&str], input: &[u8]) -> std::process::Output {
    let mut child = cmd()
        .arg("decode")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    // The child may exit before reading everything (limits, usage errors).
    let _ = child.stdin.take().expect("stdin").write_all(input);
    child.wait_with_output().expect("output")
}

#[test]
fn decode_file_success() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("person.json");
    std::fs::write(&path, br#"{"name":"Ada","age":36}"#).expect("write");

    let output = cmd()
        .args(["decode", "--strict", path.to_str().unwrap()])
        .output()
        .expect("decode");
    assert!(output.status.success());
    let value = parse_json(&output.stdout);
    assert_eq!(value["ok"], true);
    assert_eq!(value["value"]["name"], "Ada");
    assert_eq!(value["value"]["age"], 36);
}

#[test]
fn decode_stdin_type_mismatch() {
    let output = decode_stdin(&[], br#"{"name":"Ada","age":"thirty"}"#);
    assert_eq!(output.status.code(), Some(1));
    let value = parse_json(&output.stdout);
    assert_eq!(value["error"]["kind"], "TypeMismatch");
    assert_eq!(value["error"]["status"], 400);
    let message = value["error"]["message"].as_str().expect("message");
    assert!(message.contains("\"age\""));
}

#[test]
fn decode_stdin_strict_unknown_field() {
    let input = br#"{"name":"Ada","age":36,"nickname":"countess"}"#;

    let strict = decode_stdin(&["--strict"], input);
    assert_eq!(strict.status.code(), Some(1));
    let value = parse_json(&strict.stdout);
    assert_eq!(value["error"]["kind"], "UnknownField");
    assert_eq!(
        value["error"]["message"],
        "Request body contains unknown field \"nickname\""
    );

    let lenient = decode_stdin(&[], input);
    assert!(lenient.status.success());
}

#[test]
fn decode_stdin_over_limit() {
    let output = decode_stdin(&["--max-body-bytes", "8"], br#"{"name":"Ada","age":36}"#);
    assert_eq!(output.status.code(), Some(1));
    let value = parse_json(&output.stdout);
    assert_eq!(value["error"]["kind"], "BodyTooLarge");
    assert_eq!(value["error"]["status"], 413);
    assert_eq!(
        value["error"]["message"],
        "request body must not be larger than 8 bytes"
    );
}

#[test]
fn decode_missing_file_is_io_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("missing.json");
    let output = cmd()
        .args(["decode", path.to_str().unwrap()])
        .output()
        .expect("decode");
    assert_eq!(output.status.code(), Some(74));
    let value = parse_json(&output.stderr);
    assert_eq!(value["error"]["kind"], "Io");
}

#[test]
fn zero_body_limit_is_usage_error() {
    let output = decode_stdin(&["--max-body-bytes", "0"], b"{}");
    assert_eq!(output.status.code(), Some(2));
    let value = parse_json(&output.stderr);
    assert_eq!(value["error"]["kind"], "Usage");
}
