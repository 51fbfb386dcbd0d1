use crate::prelude::*;
use predicates::prelude::*;

#[test]
fn status_shows_publish_internal_pending_while_blocked() {
    let run_dir = RunDir::new();
    start(&run_dir.path(), &[]).success();

    status(&run_dir.path(), &[])
        .success()
        .stdout(predicate::str::contains("BLOCKED"))
        .stdout(predicate::str::contains("publish_internal"));
}

#[test]
fn blocked_run_never_writes_run_completed_until_approved() {
    let run_dir = RunDir::new();
    start(&run_dir.path(), &[]).success();
    resume(&run_dir.path(), &[]).success();
    resume(&run_dir.path(), &[]).success();

    let events = read_event_log(&run_dir.path());
    assert!(!events
        .iter()
        .any(|e| e["event_type"] == "run.completed"));

    resume(&run_dir.path(), &["--approve-manual-gate"]).success();
    let events = read_event_log(&run_dir.path());
    assert!(events.iter().any(|e| e["event_type"] == "run.completed"));
}

#[test]
fn json_status_reports_manual_gated_step_state() {
    let run_dir = RunDir::new();
    start(&run_dir.path(), &[]).success();

    let assert = status(&run_dir.path(), &["--json"]).success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(value["run_state"], "BLOCKED");
}
