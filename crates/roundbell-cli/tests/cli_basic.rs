//! Basic CLI E2E tests.
//!
//! Each test points the binary at its own config file in a temp dir.

use std::path::{Path, PathBuf};
use std::time::Duration;

use assert_cmd::Command;
use tempfile::TempDir;

fn config_file(dir: &TempDir) -> PathBuf {
    dir.path().join("config.toml")
}

fn roundbell(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("roundbell").unwrap();
    cmd.arg("--config").arg(config).env_remove("RUST_LOG");
    cmd
}

/// Run and return stdout, asserting success.
fn run_ok(config: &Path, args: &[&str]) -> String {
    let output = roundbell(config).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "roundbell {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn test_preset_list() {
    let dir = TempDir::new().unwrap();
    let out = run_ok(&config_file(&dir), &["preset", "list"]);
    assert!(out.contains("single"));
    assert!(out.contains("two-phase"));
}

#[test]
fn test_preset_show_json() {
    let dir = TempDir::new().unwrap();
    let out = run_ok(&config_file(&dir), &["preset", "show", "two-phase"]);
    let preset: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(preset["session_secs"], 2700);
    assert_eq!(preset["rest"]["duration_secs"], 30);
}

#[test]
fn test_preset_show_unknown_fails() {
    let dir = TempDir::new().unwrap();
    let output = roundbell(&config_file(&dir))
        .args(["preset", "show", "tabata"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown preset"));
}

#[test]
fn test_config_get_set() {
    let dir = TempDir::new().unwrap();
    let cfg = config_file(&dir);
    assert_eq!(run_ok(&cfg, &["config", "get", "preset"]).trim(), "single");
    assert!(cfg.exists());

    assert_eq!(run_ok(&cfg, &["config", "set", "audio.volume", "40"]).trim(), "ok");
    assert_eq!(run_ok(&cfg, &["config", "get", "audio.volume"]).trim(), "40");

    let list: serde_json::Value =
        serde_json::from_str(&run_ok(&cfg, &["config", "list"])).unwrap();
    assert_eq!(list["audio"]["volume"], 40);

    run_ok(&cfg, &["config", "reset"]);
    assert_eq!(run_ok(&cfg, &["config", "get", "audio.volume"]).trim(), "80");
}

#[test]
fn test_config_rejects_bad_values() {
    let dir = TempDir::new().unwrap();
    let cfg = config_file(&dir);
    roundbell(&cfg)
        .args(["config", "set", "audio.nope", "1"])
        .assert()
        .failure();
    roundbell(&cfg)
        .args(["config", "set", "preset", "tabata"])
        .assert()
        .failure();
    roundbell(&cfg)
        .args(["config", "get", "nope"])
        .assert()
        .failure();
    assert_eq!(run_ok(&cfg, &["config", "get", "preset"]).trim(), "single");
}

#[test]
fn test_config_path() {
    let dir = TempDir::new().unwrap();
    let cfg = config_file(&dir);
    let out = run_ok(&cfg, &["config", "path"]);
    assert_eq!(out.trim(), cfg.display().to_string());
}

#[test]
fn test_simulate_full_session() {
    let dir = TempDir::new().unwrap();
    let out = run_ok(&config_file(&dir), &["simulate", "--preset", "single"]);
    let events = json_lines(&out);
    let count = |kind: &str| events.iter().filter(|e| e["type"] == kind).count();

    assert_eq!(events[0]["type"], "timer_started");
    assert_eq!(count("interval_completed"), 14);
    assert_eq!(count("session_completed"), 1);
    assert_eq!(count("announcement"), 7 * 15);

    let last = events.last().unwrap();
    assert_eq!(last["type"], "state_snapshot");
    assert_eq!(last["complete"], true);
    assert_eq!(last["round"], 15);
}

#[test]
fn test_simulate_with_cues() {
    let dir = TempDir::new().unwrap();
    let out = run_ok(
        &config_file(&dir),
        &["simulate", "--preset", "two-phase", "--ticks", "180", "--cues"],
    );
    let events = json_lines(&out);
    let rest = events
        .iter()
        .find(|e| e["event"]["type"] == "rest_started")
        .unwrap();
    assert_eq!(rest["cue"]["tone"], "short_beep");
    assert_eq!(rest["cue"]["speech"], "Break time, thirty seconds.");

    let done = events
        .iter()
        .find(|e| e["event"]["type"] == "interval_completed")
        .unwrap();
    assert_eq!(done["event"]["closing_phase"], "rest");
    assert_eq!(done["cue"]["tone"], "phase_horn");
}

#[test]
fn test_run_piped_custom_session() {
    let dir = TempDir::new().unwrap();
    let cfg = config_file(&dir);
    std::fs::write(
        &cfg,
        r#"
preset = "custom"

[custom]
work_secs = 3
rest_secs = 0
session_secs = 5
work_marks = [1]

[celebration]
enabled = false
"#,
    )
    .unwrap();

    let output = roundbell(&cfg)
        .args(["run", "--start", "--speed", "100"])
        .write_stdin("")
        .timeout(Duration::from_secs(30))
        .output()
        .unwrap();
    assert!(output.status.success());
    let out = String::from_utf8_lossy(&output.stdout);
    assert!(out.contains("started work 00:03"));
    assert!(out.contains("\"One\""));
    assert!(out.contains("round 1 complete"));
    assert!(out.contains("session complete in round 2"));
    assert!(out.contains("\"Workout complete. Great work.\""));
    // No player is configured, so tones ring the bell on stderr.
    assert!(!out.contains('\u{7}'));
    assert!(String::from_utf8_lossy(&output.stderr).contains('\u{7}'));
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    let out = run_ok(&config_file(&dir), &["completions", "bash"]);
    assert!(out.contains("roundbell"));
}
