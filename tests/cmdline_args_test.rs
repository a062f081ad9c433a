//! Tests for command-line argument parsing and the binary's exit behavior
//!
//! These run the compiled binary with pose samples fed from a file, using a
//! configuration without channels so no network traffic is produced.


use dmx_head_tracker::config::Config;
use std::process::{Command, Output};
use tempfile::TempDir;
use test_helpers::{offline_config, write_config};

fn tracker(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dmx-head-tracker"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("binary should start")
}

#[test]
fn test_help_argument() {
    let output = tracker(&["--help"]);
    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for flag in ["--config", "--input", "--osc", "--http", "--rate", "--no-persist", "--debug"] {
        assert!(help.contains(flag), "help should mention {flag}");
    }
}

#[test]
fn test_print_config_emits_defaults() {
    let output = tracker(&["--print-config"]);
    assert!(output.status.success());
    let config = Config::from_json_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_osc_http_conflict() {
    let output = tracker(&["--osc", "--http", "--print-config"]);
    assert!(!output.status.success());
}

#[test]
fn test_zero_rate_rejected() {
    let output = tracker(&["--rate", "0", "--print-config"]);
    assert!(!output.status.success());
}

#[test]
fn test_runs_file_input_without_persisting_overrides() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path(), "tracker.json", &offline_config());
    let input_path = dir.path().join("poses.txt");
    std::fs::write(&input_path, "0.0 0.0\n0.5,-0.5\n-\n").unwrap();

    let output = tracker(&[
        "--config",
        config_path.to_str().unwrap(),
        "--input",
        input_path.to_str().unwrap(),
        "--rate",
        "40",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    // the file keeps its own rate; --rate only applies to this run
    let saved = Config::from_file(&config_path).unwrap();
    assert_eq!(saved.update_rate, 20);
    assert_eq!(saved, offline_config());
}

#[test]
fn test_unparseable_config_survives_run() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("tracker.json");
    let original = r#"{"panChannel": 0, "tiltChannel": 0, "cameraIndex": 2,}"#;
    std::fs::write(&config_path, original).unwrap();
    let input_path = dir.path().join("poses.txt");
    std::fs::write(&input_path, "-
").unwrap();

    let output = tracker(&[
        "--config",
        config_path.to_str().unwrap(),
        "--input",
        input_path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(std::fs::read_to_string(&config_path).unwrap(), original);
}

#[test]
fn test_no_persist_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path(), "tracker.json", &offline_config());
    let before = std::fs::read_to_string(&config_path).unwrap();
    let input_path = dir.path().join("poses.txt");
    std::fs::write(&input_path, "0.1 0.1\n").unwrap();

    let output = tracker(&[
        "-C",
        config_path.to_str().unwrap(),
        "-i",
        input_path.to_str().unwrap(),
        "--osc",
        "--no-persist",
    ]);
    assert!(output.status.success());
    assert_eq!(std::fs::read_to_string(&config_path).unwrap(), before);
}

#[test]
fn test_missing_input_file_fails() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path(), "tracker.json", &offline_config());
    let output = tracker(&[
        "--config",
        config_path.to_str().unwrap(),
        "--input",
        dir.path().join("absent.txt").to_str().unwrap(),
    ]);
    assert!(!output.status.success());
}

#[cfg(unix)]
#[test]
fn test_interrupt_stops_loop_and_saves_config() {
    use std::io::Write;
    use std::process::Stdio;
    use std::thread;
    use std::time::{Duration, Instant};

    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("tracker.json");
    std::fs::write(&config_path, r#"{"panChannel": 0, "tiltChannel": 0, "cameraIndex": 3}"#).unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_dmx-head-tracker"))
        .args(["--config", config_path.to_str().unwrap()])
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("binary should start");
    let mut stdin = child.stdin.take().unwrap();
    writeln!(stdin, "0.1 0.1").unwrap();
    thread::sleep(Duration::from_millis(500));

    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());
    thread::sleep(Duration::from_millis(100));

    // input stays open: the loop ends on the stop flag, not on EOF
    writeln!(stdin, "0.2 0.2").unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    let exit = loop {
        if let Some(exit) = child.try_wait().unwrap() {
            break exit;
        }
        if Instant::now() > deadline {
            child.kill().unwrap();
            panic!("tracker did not stop after SIGINT");
        }
        thread::sleep(Duration::from_millis(20));
    };
    drop(stdin);
    assert!(exit.success());

    // saved in full form, foreign key kept
    let saved = std::fs::read_to_string(&config_path).unwrap();
    assert!(saved.contains("updateRate"));
    assert!(saved.contains("cameraIndex"));
}
