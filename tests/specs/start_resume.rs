use crate::prelude::*;
use predicates::prelude::*;

/// The default demo DAG's last step is manual-gated, so a fresh `start` run
/// always stops at `BLOCKED` rather than completing on its own.
#[test]
fn start_runs_to_the_manual_gate_and_blocks() {
    let run_dir = RunDir::new();

    start(&run_dir.path(), &[])
        .success()
        .stdout(predicate::str::contains("BLOCKED"));

    let events = read_event_log(&run_dir.path());
    let types: Vec<&str> = events
        .iter()
        .map(|e| e["event_type"].as_str().unwrap())
        .collect();

    assert!(types.contains(&"run.created"));
    assert!(!types.contains(&"run.completed"));
    assert_eq!(types.iter().filter(|t| **t == "step.started").count(), 7);
}

#[test]
fn resume_without_approval_stays_blocked() {
    let run_dir = RunDir::new();
    start(&run_dir.path(), &[]).success();

    resume(&run_dir.path(), &[])
        .success()
        .stdout(predicate::str::contains("BLOCKED"));
}

#[test]
fn resume_with_approval_completes_the_run() {
    let run_dir = RunDir::new();
    start(&run_dir.path(), &[]).success();

    resume(&run_dir.path(), &["--approve-manual-gate"])
        .success()
        .stdout(predicate::str::contains("SUCCEEDED"));

    let events = read_event_log(&run_dir.path());
    let last = events.last().expect("at least one event");
    assert_eq!(last["event_type"], "run.completed");
    assert_eq!(last["new_state"], "SUCCEEDED");
}

#[test]
fn start_records_the_given_reason_on_run_created() {
    let run_dir = RunDir::new();
    start(&run_dir.path(), &["--reason", "integration test kickoff"]).success();

    let events = read_event_log(&run_dir.path());
    assert_eq!(events[0]["event_type"], "run.created");
    assert_eq!(events[0]["reason"], "integration test kickoff");
}
