//! CLI Output Framing Tests
//!
//! Runs the real `keyledger` binary. Stdout must carry exactly one JSON
//! response per request and nothing else; log lines belong on stderr.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn write_config(dir: &TempDir) -> PathBuf {
    let config_path = dir.path().join("keyledger.json");
    let config = serde_json::json!({
        "data_dir": dir.path().join("data").display().to_string(),
        "administrator": "admin",
        "log_level": "TRACE",
    });
    fs::write(&config_path, config.to_string()).unwrap();
    config_path
}

fn run_keyledger(subcommand: &str, config: &Path, stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_keyledger"))
        .arg(subcommand)
        .arg("--config")
        .arg(config)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn keyledger");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout_lines(output: &Output) -> Vec<Value> {
    assert!(
        output.status.success(),
        "keyledger failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn initialized_dir() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let lines = stdout_lines(&run_keyledger("init", &config, ""));
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["status"], "ok");
    (dir, config)
}

// =============================================================================
// Framing
// =============================================================================

#[test]
fn test_start_writes_one_line_per_request() {
    let (_dir, config) = initialized_dir();

    let requests = concat!(
        r#"{"op":"store","actor":"u","key":"k","value":"v"}"#,
        "\n",
        r#"{"op":"delete","actor":"stranger","id":1}"#,
        "\n",
        r#"{"op":"active_record_count"}"#,
        "\n",
    );
    let output = run_keyledger("start", &config, requests);
    let lines = stdout_lines(&output);

    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|line| line.get("event").is_none()));
    assert_eq!(lines[0]["data"]["id"], 1);
    assert_eq!(lines[1]["code"], "KEYLEDGER_UNAUTHORIZED");
    assert_eq!(lines[2]["data"]["count"], 1);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("RECORD_STORED"));
    assert!(stderr.contains("OPERATION_REJECTED"));
}

#[test]
fn test_exec_writes_single_response() {
    let (_dir, config) = initialized_dir();

    let output = run_keyledger(
        "exec",
        &config,
        "{\"op\":\"store\",\"actor\":\"u\",\"key\":\"k\",\"value\":\"v\"}\n",
    );
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["status"], "ok");
    assert_eq!(lines[0]["events"][0]["type"], "STORED");
}

#[test]
fn test_stats_writes_single_response() {
    let (_dir, config) = initialized_dir();
    run_keyledger(
        "exec",
        &config,
        "{\"op\":\"store\",\"actor\":\"u\",\"key\":\"k\",\"value\":\"v\"}\n",
    );

    let lines = stdout_lines(&run_keyledger("stats", &config, ""));
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["data"]["total_records"], 1);
    assert_eq!(lines[0]["data"]["administrator"], "admin");
}
