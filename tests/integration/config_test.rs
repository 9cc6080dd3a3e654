//! Configuration layering: file, environment and command-line flags.

use clap::Parser;
use doc_analytics::cli::Cli;
use doc_analytics::config::{Config, Locale};
use pretty_assertions::assert_eq;
use std::path::Path;

fn write_config(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

/// Loads a config the way the binary does, with an injected environment.
fn layered(cli: &Cli, env: &[(&str, &str)]) -> Config {
    let mut config = Config::load_from_file(&cli.config_path()).unwrap();
    config.analytics.apply_defaults_from(|key| {
        env.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    });
    cli.apply_overrides(&mut config).unwrap();
    config.validate().unwrap();
    config
}

#[test]
fn test_flags_override_file_and_environment() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "[analytics]\napi_url = \"http://file:4002/cubejs-api/v1\"\n\n[ui]\nlocale = \"en\"\npage_size = 50\n",
    );
    let path = path.to_str().unwrap();

    let env = [
        ("CUBEJS_API_URL", "http://env:4002/cubejs-api/v1"),
        ("CUBEJS_API_TOKEN", "env-token"),
    ];

    let cli = Cli::parse_from(["doc-analytics", "--config", path]);
    let config = layered(&cli, &env);
    assert_eq!(config.analytics.api_url(), "http://file:4002/cubejs-api/v1");
    assert_eq!(config.analytics.token.as_deref(), Some("env-token"));
    assert_eq!(config.ui.locale, Locale::En);
    assert_eq!(config.ui.page_size, 50);

    let cli = Cli::parse_from([
        "doc-analytics",
        "--config",
        path,
        "--api-url",
        "http://flag:4002/cubejs-api/v1",
        "--locale",
        "ru",
        "--page-size",
        "10",
    ]);
    let config = layered(&cli, &env);
    assert_eq!(config.analytics.api_url(), "http://flag:4002/cubejs-api/v1");
    assert_eq!(config.ui.locale, Locale::Ru);
    assert_eq!(config.ui.page_size, 10);
}

#[test]
fn test_environment_fills_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let cli = Cli::parse_from(["doc-analytics", "--config", missing.to_str().unwrap()]);

    let config = layered(&cli, &[("CUBEJS_API_URL", "https://cube.example.com/cubejs-api/v1")]);
    assert_eq!(config.analytics.api_url(), "https://cube.example.com/cubejs-api/v1");
    assert_eq!(config.analytics.display_string(), "cube.example.com");
    assert!(config.analytics.enabled);
}

#[test]
fn test_disabled_in_file_stays_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[analytics]\nenabled = false\n");
    let cli = Cli::parse_from(["doc-analytics", "--config", path.to_str().unwrap()]);

    assert!(!layered(&cli, &[]).analytics.enabled);
}

#[test]
fn test_invalid_page_size_flag_fails_validation() {
    let cli = Cli::parse_from(["doc-analytics", "--page-size", "7"]);
    let mut config = Config::default();
    cli.apply_overrides(&mut config).unwrap();

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("page_size"));
}

#[test]
fn test_config_file_locale_reaches_screen() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[ui]\nlocale = \"en\"\n");

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_doc-analytics"))
        .args([
            "--config",
            path.to_str().unwrap(),
            "--headless",
            "--no-remote",
            "--events",
            "key:f5",
        ])
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("Employee"), "{stdout}");
    assert!(stdout.contains("Conversion (%)"));
    assert!(!stdout.contains("Сотрудник"));
}
