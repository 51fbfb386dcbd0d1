// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn dag() -> PipelineDag {
    PipelineDag::new(prun_core::default_pipeline_steps())
}

#[test]
fn run_state_machine_rejects_illegal_jump() {
    let err = RunStateMachine::validate_transition(RunState::Created, RunState::Executing)
        .unwrap_err();
    assert!(matches!(err, RuntimeError::IllegalRunTransition { .. }));
}

#[test]
fn run_state_machine_accepts_legal_transition() {
    assert!(
        RunStateMachine::validate_transition(RunState::Created, RunState::PreflightValidated)
            .is_ok()
    );
}

#[test]
fn hard_gate_failure_never_retries() {
    let step = prun_core::StepDefinition::new("g", "G")
        .hard_gate()
        .with_max_retries(3);
    assert!(!RetryPolicy::allows_retry(
        &step,
        ErrorClass::HardGateFailed,
        0
    ));
}

#[test]
fn hard_gate_step_can_still_retry_transient_io() {
    let step = prun_core::StepDefinition::new("g", "G")
        .hard_gate()
        .with_max_retries(2);
    assert!(RetryPolicy::allows_retry(&step, ErrorClass::TransientIo, 0));
}

#[test]
fn backoff_grows_exponentially_and_caps() {
    let d0 = RetryPolicy::backoff_seconds(0, 2.0, 60.0);
    let d1 = RetryPolicy::backoff_seconds(1, 2.0, 60.0);
    assert!(d0 >= 2.0 && d0 < 2.2);
    assert!(d1 >= 4.0 && d1 < 4.4);

    let capped = RetryPolicy::backoff_seconds(10, 2.0, 60.0);
    assert!(capped >= 60.0 && capped < 66.0);
}

#[test]
fn dag_upstream_and_downstream_are_ordered() {
    let dag = dag();
    let upstream = dag.get_upstream_steps("validate_bundle_quality");
    assert_eq!(
        upstream,
        vec![
            "preflight_contract_check",
            "phase_benchmark",
            "stage_data_layout",
            "build_steward_bundle",
        ]
    );
    let downstream = dag.get_downstream_steps("validate_bundle_quality");
    assert_eq!(
        downstream,
        vec!["build_minimal_deliverable", "verify_artifacts", "publish_internal"]
    );
}

#[test]
fn can_execute_step_blocks_on_missing_dependency() {
    let dag = dag();
    let completed = HashSet::new();
    let failed = HashSet::new();
    let (ok, reason) = dag.can_execute_step("phase_benchmark", &completed, &failed);
    assert!(!ok);
    assert!(reason.unwrap().contains("preflight_contract_check"));
}

#[test]
fn can_execute_step_blocks_on_failed_upstream_hard_gate() {
    let dag = dag();
    let mut completed = HashSet::new();
    completed.insert("preflight_contract_check".to_string());
    let mut failed = HashSet::new();
    failed.insert("preflight_contract_check".to_string());

    let (ok, reason) = dag.can_execute_step("phase_benchmark", &completed, &failed);
    assert!(!ok);
    assert!(reason.unwrap().contains("failed hard gate"));
}

#[test]
fn can_execute_step_allows_when_dependencies_satisfied() {
    let dag = dag();
    let mut completed = HashSet::new();
    completed.insert("preflight_contract_check".to_string());
    let failed = HashSet::new();

    let (ok, reason) = dag.can_execute_step("phase_benchmark", &completed, &failed);
    assert!(ok);
    assert!(reason.is_none());
}

#[test]
fn can_execute_step_rejects_unknown_step() {
    let dag = dag();
    let (ok, reason) = dag.can_execute_step("nope", &HashSet::new(), &HashSet::new());
    assert!(!ok);
    assert!(reason.unwrap().contains("unknown step"));
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const RUN_STATES: [RunState; 7] = [
        RunState::Created,
        RunState::PreflightValidated,
        RunState::Executing,
        RunState::Blocked,
        RunState::Failed,
        RunState::Succeeded,
        RunState::RolledBack,
    ];

    fn run_state() -> impl Strategy<Value = RunState> {
        (0..RUN_STATES.len()).prop_map(|i| RUN_STATES[i])
    }

    proptest! {
        // P3: a terminal run state (SUCCEEDED, ROLLED_BACK) never has a
        // legal outgoing transition to anything, including itself.
        #[test]
        fn terminal_run_states_have_no_legal_outgoing_transition(
            from in run_state(), to in run_state(),
        ) {
            if from.is_terminal() {
                prop_assert!(!RunStateMachine::can_transition(from, to));
            }
        }

        // R1/R3: a hard gate's own HARD_GATE_FAILED never retries, but the
        // same step can still retry a TRANSIENT_IO failure within budget.
        #[test]
        fn hard_gate_failed_is_never_retryable_on_a_hard_gate(
            max_retries in 0u32..5, attempt in 0u32..5,
        ) {
            let step = prun_core::StepDefinition::new("g", "G")
                .hard_gate()
                .with_max_retries(max_retries);
            prop_assert!(!RetryPolicy::allows_retry(&step, ErrorClass::HardGateFailed, attempt));
        }

        // Backoff is monotonically non-decreasing in `attempt` and never
        // exceeds the cap plus its 10% jitter ceiling.
        #[test]
        fn backoff_is_monotonic_and_bounded(attempt in 0u32..20) {
            let base = 2.0;
            let cap = 60.0;
            let delay = RetryPolicy::backoff_seconds(attempt, base, cap);
            prop_assert!(delay >= (base * 2f64.powi(attempt as i32)).min(cap));
            prop_assert!(delay <= cap * 1.1);
        }

        // P4 (fail-closed): once a step is in the failed-hard-gates set, no
        // downstream step may execute, regardless of what else has
        // completed.
        #[test]
        fn downstream_of_a_failed_hard_gate_never_executes(gate_idx in 0usize..8, target_offset in 1usize..8) {
            let dag = dag();
            let order = dag.order().to_vec();
            let gate_idx = gate_idx.min(order.len() - 1);
            let target_idx = gate_idx + target_offset;
            if target_idx >= order.len() {
                return Ok(());
            }
            let gate = order[gate_idx].clone();
            let target = order[target_idx].clone();

            let mut failed = HashSet::new();
            failed.insert(gate);
            let completed: HashSet<String> = order[..target_idx].iter().cloned().collect();

            let (ok, reason) = dag.can_execute_step(&target, &completed, &failed);
            prop_assert!(!ok);
            prop_assert!(reason.unwrap().contains("failed hard gate"));
        }
    }
}
