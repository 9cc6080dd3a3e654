//! Common test utilities for TUI tests.

use std::process::Command;

/// Runs doc-analytics in headless mode with the given arguments.
/// Uses the binary cargo builds for integration tests instead of `cargo run`.
pub fn run_headless(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_doc-analytics"))
        .args(args)
        .env_remove("CUBEJS_API_URL")
        .env_remove("CUBEJS_API_TOKEN")
        .env_remove("RUST_LOG")
        .env("DOC_ANALYTICS_CONFIG", "/nonexistent/doc-analytics.toml")
        .output()
        .expect("Failed to execute command");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}
