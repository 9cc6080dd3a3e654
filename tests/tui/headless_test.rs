//! Integration tests for headless mode, run through the built binary.

use super::common::run_headless;

#[test]
fn test_headless_basic_execution() {
    let (code, stdout, _) = run_headless(&["--headless", "--no-remote", "--events", "key:esc"]);

    assert_eq!(code, 0, "Expected exit code 0");
    assert!(
        stdout.contains("Events: 1 executed"),
        "Should show events executed"
    );
}

#[test]
fn test_headless_requires_events() {
    let (code, _, stderr) = run_headless(&["--headless", "--no-remote"]);

    assert_eq!(code, 1);
    assert!(stderr.contains("requires --events or --script"));
}

#[test]
fn test_headless_execute_shows_report() {
    let (code, stdout, _) = run_headless(&[
        "--headless",
        "--no-remote",
        "--events",
        "key:f5,assert:contains:Иван Иванов,assert:state:row_count=4",
    ]);

    assert_eq!(code, 0, "stdout: {stdout}");
    assert!(stdout.contains("Мария Петрова"));
    assert!(stdout.contains("Assertions: 2 passed, 0 failed"));
}

#[test]
fn test_headless_assertion_failure_exit_code() {
    let (code, stdout, _) = run_headless(&[
        "--headless",
        "--no-remote",
        "--events",
        "assert:contains:this text is not on screen",
    ]);

    assert_eq!(code, 1);
    assert!(stdout.contains("Assertions: 0 passed, 1 failed"));
}

#[test]
fn test_headless_fail_fast_stops_script() {
    let (code, stdout, _) = run_headless(&[
        "--headless",
        "--no-remote",
        "--fail-fast",
        "--events",
        "assert:state:row_count=99,key:f5,key:f5",
    ]);

    assert_eq!(code, 1);
    assert!(stdout.contains("Events: 1 executed"));
}

#[test]
fn test_headless_mock_remote_json() {
    let (code, stdout, _) = run_headless(&[
        "--headless",
        "--mock-analytics",
        "--events",
        "key:f6,wait:10ms,assert:state:source=remote",
        "--output",
        "json",
    ]);

    assert_eq!(code, 0, "stdout: {stdout}");
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(report["state"]["source"], "remote");
    assert_eq!(report["state"]["row_count"], 4);
    assert_eq!(report["state"]["remote_loading"], false);
    assert_eq!(report["assertions"]["passed"], 1);
}

#[test]
fn test_headless_disabled_remote_error() {
    let (code, stdout, _) = run_headless(&[
        "--headless",
        "--no-remote",
        "--locale",
        "en",
        "--events",
        "key:f6",
    ]);

    assert_eq!(code, 0);
    assert!(stdout.contains("Cube.js error: remote analytics disabled"));
}

#[test]
fn test_headless_frames_output() {
    let (code, stdout, _) = run_headless(&[
        "--headless",
        "--no-remote",
        "--events",
        "key:f5,key:tab",
        "--output",
        "frames",
    ]);

    assert_eq!(code, 0);
    assert!(stdout.contains("=== FRAME 0 (initial) ==="));
    assert!(stdout.contains("=== FRAME 1 (key:f5) ==="));
    assert!(stdout.contains("=== FRAME 2 (key:tab) ==="));
    assert!(stdout.contains("Total: 3 frames, 2 events"));
}

#[test]
fn test_headless_script_file() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("report.txt");
    std::fs::write(
        &script,
        "# run the report\nkey:f5\nkey:tab\nkey:s\nassert:state:sort=Month:asc\n",
    )
    .unwrap();

    let (code, stdout, _) = run_headless(&[
        "--headless",
        "--no-remote",
        "--script",
        script.to_str().unwrap(),
    ]);

    assert_eq!(code, 0, "stdout: {stdout}");
    assert!(stdout.contains("Assertions: 1 passed, 0 failed"));
}

#[test]
fn test_headless_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("screen.txt");

    let (code, stdout, _) = run_headless(&[
        "--headless",
        "--no-remote",
        "--events",
        "key:f5",
        "--output-file",
        output.to_str().unwrap(),
    ]);

    assert_eq!(code, 0);
    assert!(stdout.is_empty());
    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("Иван Иванов"));
}
