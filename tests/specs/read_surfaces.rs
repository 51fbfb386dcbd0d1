use crate::prelude::*;
use predicates::prelude::*;

#[test]
fn events_text_output_matches_the_fixed_line_shape() {
    let run_dir = RunDir::new();
    start(&run_dir.path(), &["--reason", "smoke"]).success();

    let assert = events(&run_dir.path(), &[]).success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let first_line = stdout.lines().next().expect("at least one event line");

    assert!(first_line.contains("run.created"));
    assert!(first_line.contains("reason=\"smoke\""));
    // timestamp[:19] is exactly "YYYY-MM-DDTHH:MM:SS"
    let ts = &first_line[..19];
    assert_eq!(ts.len(), 19);
    assert_eq!(ts.as_bytes()[10], b'T');
}

#[test]
fn events_tail_limits_to_the_last_n_lines() {
    let run_dir = RunDir::new();
    start(&run_dir.path(), &[]).success();

    let full = events(&run_dir.path(), &[]).success();
    let full_count = String::from_utf8_lossy(&full.get_output().stdout)
        .lines()
        .count();

    let tailed = events(&run_dir.path(), &["--tail", "3"]).success();
    let tail_count = String::from_utf8_lossy(&tailed.get_output().stdout)
        .lines()
        .count();

    assert_eq!(tail_count, 3);
    assert!(full_count > tail_count);
}

#[test]
fn events_json_lines_round_trip_through_serde() {
    let run_dir = RunDir::new();
    start(&run_dir.path(), &[]).success();

    let assert = events(&run_dir.path(), &["--json"]).success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    for line in stdout.lines() {
        let _: serde_json::Value = serde_json::from_str(line).expect("each line is valid json");
    }
}

#[test]
fn status_text_reports_completed_step_count() {
    let run_dir = RunDir::new();
    start(&run_dir.path(), &[]).success();

    // The default demo DAG blocks on its manual gate after its other seven
    // steps succeed.
    status(&run_dir.path(), &[])
        .success()
        .stdout(predicate::str::contains("Completed: 7"));
}

#[test]
fn summary_text_reports_hard_gate_steps_as_succeeded() {
    let run_dir = RunDir::new();
    start(&run_dir.path(), &[]).success();

    summary(&run_dir.path(), &[])
        .success()
        .stdout(predicate::str::contains("verify_artifacts"))
        .stdout(predicate::str::contains("SUCCEEDED"));
}

#[test]
fn summary_json_exposes_stats_block() {
    let run_dir = RunDir::new();
    start(&run_dir.path(), &[]).success();

    let assert = summary(&run_dir.path(), &["--json"]).success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert!(value["stats"]["total_steps"].as_u64().unwrap() >= 7);
}
