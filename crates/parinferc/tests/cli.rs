//! End-to-end tests for the Parinfer CLI.
//!
//! Each test writes a source file (or pipes stdin), invokes the built
//! binary, and asserts on stdout/stderr and the exit code.

use std::io::Write;
use std::process::{Command, Stdio};

/// Helper: run the CLI on a tempfile-backed source with the given args.
fn run_on_file(source: &str, args: &[&str]) -> std::process::Output {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = temp_dir.path().join("input.clj");
    std::fs::write(&path, source).expect("failed to write input file");

    Command::new(env!("CARGO_BIN_EXE_parinferc"))
        .args(args)
        .arg(&path)
        .output()
        .expect("failed to invoke parinferc")
}

/// Helper: run the CLI with the source piped through stdin.
fn run_on_stdin(source: &str, args: &[&str]) -> std::process::Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_parinferc"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn parinferc");

    child
        .stdin
        .take()
        .expect("child has piped stdin")
        .write_all(source.as_bytes())
        .expect("failed to write stdin");

    child.wait_with_output().expect("failed to wait for parinferc")
}

#[test]
fn indent_mode_closes_parens_from_file() {
    let output = run_on_file("(foo\n  bar", &["--mode", "indent"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "(foo\n  bar)");
}

#[test]
fn paren_mode_fixes_indentation_from_stdin() {
    let output = run_on_stdin("(foo\nbar)", &["--mode", "paren"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "(foo\n bar)");
}

#[test]
fn json_result_carries_paren_trails() {
    let output = run_on_file("(foo\n  bar", &["--mode", "indent", "--json"]);
    assert!(output.status.success());

    let answer: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(answer["success"], true);
    assert_eq!(answer["text"], "(foo\n  bar)");
    assert_eq!(answer["parenTrails"][0]["lineNo"], 1);
    assert_eq!(answer["parenTrails"][0]["startX"], 5);
    assert_eq!(answer["parenTrails"][0]["endX"], 6);
}

#[test]
fn smart_mode_applies_changes() {
    let output = run_on_stdin(
        "  (foo\n  bar)",
        &[
            "--mode",
            "smart",
            "--changes",
            r#"[{"lineNo": 0, "x": 0, "oldText": "", "newText": "  "}]"#,
        ],
    );
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "  (foo\n    bar)");
}

#[test]
fn paren_mode_error_reports_position_and_fails() {
    let output = run_on_file("(foo", &["--mode", "paren"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unclosed open-paren"),
        "stderr did not mention the error: {}",
        stderr
    );
}

#[test]
fn json_error_record_keeps_exit_code_zero() {
    let output = run_on_file("(foo", &["--mode", "paren", "--json"]);
    assert!(output.status.success());

    let answer: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(answer["success"], false);
    assert_eq!(answer["error"]["name"], "unclosed-paren");
    assert_eq!(answer["error"]["lineNo"], 0);
    assert_eq!(answer["error"]["x"], 0);
    assert_eq!(answer["text"], "(foo");
}

#[test]
fn invalid_changes_json_is_rejected() {
    let output = run_on_stdin("(foo)", &["--mode", "smart", "--changes", "not json"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse --changes"), "{}", stderr);
}
