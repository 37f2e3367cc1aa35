//! Basic CLI E2E tests.
//!
//! Each test runs the compiled binary against its own temporary data dir.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_pomotimer"))
        .args(args)
        .env("POMOTIMER_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    stdout
}

#[test]
fn test_format_and_parse() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(run_cli_success(dir.path(), &["format", "90"]).trim(), "1:30");
    assert_eq!(run_cli_success(dir.path(), &["format", "5"]).trim(), "0:05");
    assert_eq!(run_cli_success(dir.path(), &["parse", "25:00"]).trim(), "1500");
}

#[test]
fn test_parse_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["parse", "12"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error: Format error: expected 'M:SS', got '12'"));
}

#[test]
fn test_history_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(dir.path(), &["history", "list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed, serde_json::json!([]));
}

#[test]
fn test_history_add_show_remove() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(
        dir.path(),
        &[
            "history",
            "add",
            "--start",
            "2024-03-01T09:00:00Z",
            "--end",
            "2024-03-01T09:25:00Z",
        ],
    );
    let entry: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(entry["duration"], 1500);
    assert_eq!(entry["start"], 1_709_283_600_000i64);
    let id = entry["id"].as_str().unwrap().to_string();

    let shown = run_cli_success(dir.path(), &["history", "show", &id]);
    assert!(shown.contains(&id));

    let summary: serde_json::Value =
        serde_json::from_str(&run_cli_success(dir.path(), &["history", "summary"])).unwrap();
    assert_eq!(summary["sessions"], 1);
    assert_eq!(summary["total_secs"], 1500);

    run_cli_success(dir.path(), &["history", "remove", &id]);
    let (_, _, code) = run_cli(dir.path(), &["history", "remove", &id]);
    assert_ne!(code, 0);

    let list: serde_json::Value =
        serde_json::from_str(&run_cli_success(dir.path(), &["history", "list", "--json"])).unwrap();
    assert_eq!(list, serde_json::json!([]));
}

#[test]
fn test_history_add_rejects_reversed_range() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &[
            "history",
            "add",
            "--start",
            "2024-03-01T10:00:00Z",
            "--end",
            "2024-03-01T09:00:00Z",
        ],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("end must not be before start"));
}

#[test]
fn test_config_set_and_plan() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        run_cli_success(dir.path(), &["config", "get", "schedule.focus_duration"]).trim(),
        "25"
    );
    run_cli_success(dir.path(), &["config", "set", "schedule.focus_duration", "50"]);

    let plan: serde_json::Value =
        serde_json::from_str(&run_cli_success(dir.path(), &["timer", "plan"])).unwrap();
    assert_eq!(plan["focus_secs"], 3000);

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "schedule.nope", "1"]);
    assert_ne!(code, 0);

    run_cli_success(dir.path(), &["config", "reset"]);
    assert_eq!(
        run_cli_success(dir.path(), &["config", "get", "schedule.focus_duration"]).trim(),
        "25"
    );
}

#[test]
fn test_invalid_config_file_rejected_by_timer_commands() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[schedule]\nfocus_duration = 0\n").unwrap();

    let (_, stderr, code) = run_cli(dir.path(), &["timer", "plan"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("schedule.focus_duration"));

    let (_, stderr, code) = run_cli(dir.path(), &["timer", "run"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("schedule.focus_duration"));
}

#[test]
fn test_timer_run_quits_on_command() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_pomotimer"))
        .args(["timer", "run"])
        .env("POMOTIMER_DATA_DIR", dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"s\np\nr\nq\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[Focus] 25:00 (paused)"));
    assert!(stdout.contains("(running)"));
    assert!(stdout.contains("logged today: 0 session(s)"));
}
