use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

// Minimal valid TOML config; the device is unused with --sim and replay
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[link]
device = "/dev/null"
read_timeout_ms = 10

[safety]
max_silent_ms = 200
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

/// Transcript of a first-order motor (2 counts/tick, tau 50) stepped at
/// device time `step_at`, one record every 10 ticks.
fn write_transcript(dir: &Path, step_at: i64, until: i64) -> PathBuf {
    let mut text = String::from("boot\n");
    for t in (1000..=until).step_by(10) {
        let s = (t - step_at).max(0) as f64;
        let pos = 2.0 * (s - 50.0 * (1.0 - (-s / 50.0).exp()));
        text.push_str(&format!("T:{t},LM:{}\n", pos.round() as i64));
    }
    let path = dir.join("transcript.txt");
    fs::write(&path, text).unwrap();
    path
}

fn parse_result(stdout: &[u8]) -> (f64, f64) {
    let text = String::from_utf8_lossy(stdout);
    let line = text.lines().last().unwrap_or_default().to_string();
    let mut it = line.split_whitespace().map(|w| w.parse::<f64>().unwrap());
    (it.next().unwrap(), it.next().unwrap())
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["replay"], 2, "required", "stderr")]
#[case(&["frobnicate"], 2, "unrecognized subcommand", "stderr")]
#[case(&["step", "--sim", "--before=-5"], 1, "before_time", "stderr")]
#[case(&["self-check"], 0, "self-check ok", "stdout")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("stepid").unwrap();

    // Always include a valid config to avoid relying on default path
    cmd.arg("--config").arg(&cfg).arg("--log-level").arg("error");
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn step_on_the_simulator_prints_steady_state_and_time_constant() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let out = Command::cargo_bin("stepid")
        .unwrap()
        .args(["--log-level", "error", "--config"])
        .arg(&cfg)
        .args(["step", "--sim"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let (ss, tau) = parse_result(&out);
    assert!((ss - 2.0).abs() < 0.1, "steady state {ss}");
    assert!((30.0..=70.0).contains(&tau), "time constant {tau}");
}

#[rstest]
fn replay_identifies_a_recorded_run() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let transcript = write_transcript(dir.path(), 1110, 2000);

    let out = Command::cargo_bin("stepid")
        .unwrap()
        .args(["--log-level", "error", "--config"])
        .arg(&cfg)
        .arg("replay")
        .arg("--transcript")
        .arg(&transcript)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let (ss, tau) = parse_result(&out);
    assert!((ss - 2.0).abs() < 0.05, "steady state {ss}");
    assert!((40.0..=60.0).contains(&tau), "time constant {tau}");
}

#[rstest]
fn truncated_transcript_is_a_channel_failure() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let transcript = write_transcript(dir.path(), 1110, 1300);

    Command::cargo_bin("stepid")
        .unwrap()
        .args(["--log-level", "error", "--config"])
        .arg(&cfg)
        .arg("replay")
        .arg("--transcript")
        .arg(&transcript)
        .assert()
        .code(6)
        .stderr(predicate::str::contains("Link failed"));
}

#[rstest]
fn motor_that_never_moves_has_no_onset() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    // Step time beyond the end of the recording: position stays at 0.
    let transcript = write_transcript(dir.path(), 10_000, 2000);

    Command::cargo_bin("stepid")
        .unwrap()
        .args(["--log-level", "error", "--config"])
        .arg(&cfg)
        .arg("replay")
        .arg("--transcript")
        .arg(&transcript)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("never rose"));
}

#[rstest]
fn missing_config_file_is_reported() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("stepid")
        .unwrap()
        .current_dir(dir.path())
        .arg("self-check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to read config"));
}

#[rstest]
fn config_without_link_section_is_rejected() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, "[experiment]\nbefore_time = 100\n").unwrap();
    Command::cargo_bin("stepid")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration is invalid"));
}
