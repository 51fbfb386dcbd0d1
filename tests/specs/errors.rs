use crate::prelude::*;
use predicates::prelude::*;

#[test]
fn status_on_a_missing_run_fails() {
    let run_dir = RunDir::new();

    status(&run_dir.path(), &[])
        .failure()
        .stderr(predicate::str::contains("no run found"));
}

#[test]
fn events_on_a_missing_run_fails() {
    let run_dir = RunDir::new();

    events(&run_dir.path(), &[])
        .failure()
        .stderr(predicate::str::contains("no run found"));
}

#[test]
fn resume_on_a_completed_run_is_rejected() {
    let run_dir = RunDir::new();
    start(&run_dir.path(), &[]).success();
    resume(&run_dir.path(), &["--approve-manual-gate"]).success();

    resume(&run_dir.path(), &[])
        .failure()
        .stderr(predicate::str::contains("cannot resume run"));
}

#[test]
fn starting_over_an_existing_run_is_rejected() {
    let run_dir = RunDir::new();
    start(&run_dir.path(), &[]).success();

    start(&run_dir.path(), &[])
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn resume_from_an_unknown_step_is_rejected() {
    let run_dir = RunDir::new();
    start(&run_dir.path(), &[]).success();

    resume(&run_dir.path(), &["--from-step", "no_such_step"])
        .failure()
        .stderr(predicate::str::contains("unknown step"));
}
