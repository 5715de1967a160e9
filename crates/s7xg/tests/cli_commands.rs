#![cfg(feature = "cli")]

use std::process::{Command, Output};

fn s7xg(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_s7xg"))
        .env_remove("S7XG_PORT")
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("s7xg should run")
}

#[test]
fn version_reports_package_version() {
    let output = s7xg(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("s7xg {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn extended_version_lists_features() {
    let output = s7xg(&["version", "--extended"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: s7xg"));
    assert!(stdout.contains("cli=true"));
}

#[test]
fn send_without_port_is_usage_error() {
    let output = s7xg(&["send", "sip", "get_ver"]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--port"));
}

#[test]
fn missing_device_is_transport_error() {
    let output = s7xg(&["--port", "/dev/s7xg-does-not-exist", "info"]);
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("open failed"));
}

#[test]
fn invalid_timeout_is_rejected_before_opening() {
    let output = s7xg(&[
        "--port",
        "/dev/s7xg-does-not-exist",
        "--timeout",
        "soon",
        "gps",
    ]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn unreadable_config_is_usage_error() {
    let output = s7xg(&[
        "--port",
        "/dev/s7xg-does-not-exist",
        "--config",
        "/nonexistent/s7xg.json",
        "info",
    ]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn invalid_config_is_data_error() {
    let path = std::env::temp_dir().join(format!("s7xg-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{"timeout_ms": "ten"}"#).expect("config should be writable");

    let output = s7xg(&[
        "--port",
        "/dev/s7xg-does-not-exist",
        "--config",
        path.to_str().expect("temp path should be utf-8"),
        "info",
    ]);
    let _ = std::fs::remove_file(&path);
    assert_eq!(output.status.code(), Some(60));
}
