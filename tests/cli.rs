#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// Nothing listens on port 1, so the page check fails fast and reads as
// "not available".
const UNREACHABLE_EVENT: &str = "http://127.0.0.1:1/event/42";

fn monitor(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ticket-monitor").unwrap();
    cmd.current_dir(dir.path()).env_clear();
    cmd
}

fn state(dir: &TempDir) -> String {
    std::fs::read_to_string(dir.path().join("state.json")).unwrap()
}

#[test]
fn missing_event_url_exits_1() {
    let dir = TempDir::new().unwrap();
    monitor(&dir)
        .arg("check")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "EVENT_URL environment variable is not set; exiting.",
        ));

    assert!(!dir.path().join("state.json").exists());
}

#[test]
fn empty_event_url_exits_1() {
    let dir = TempDir::new().unwrap();
    monitor(&dir).env("EVENT_URL", "").assert().code(1);
}

#[test]
fn empty_smtp_port_does_not_mask_missing_event_url() {
    let dir = TempDir::new().unwrap();
    monitor(&dir).env("SMTP_PORT", "").assert().code(1);
}

#[test]
fn empty_smtp_port_still_checks_and_saves() {
    let dir = TempDir::new().unwrap();
    monitor(&dir)
        .env("EVENT_URL", UNREACHABLE_EVENT)
        .env("SMTP_PORT", "")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tickets available: false"));

    assert_eq!(state(&dir), r#"{"has_tickets":false}"#);
}

#[test]
fn invalid_smtp_port_still_checks_and_saves() {
    let dir = TempDir::new().unwrap();
    monitor(&dir)
        .env("EVENT_URL", UNREACHABLE_EVENT)
        .env("SMTP_PORT", "abc")
        .assert()
        .success()
        .stdout(predicate::str::contains("SMTP_PORT 'abc' is not a valid port"));

    assert_eq!(state(&dir), r#"{"has_tickets":false}"#);
}

#[test]
fn status_reports_saved_state() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("state.json"), r#"{"has_tickets": true}"#).unwrap();

    monitor(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("has_tickets = true"));
}
