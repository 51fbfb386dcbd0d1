// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step implementations backing the default eight-step demo pipeline
//! ([`prun_core::default_pipeline_steps`]).
//!
//! None of these do real work: each one hashes a small canned string so
//! `step.succeeded` carries a stable, non-empty `outputs_hash`, letting
//! `start`/`resume`/`status`/`summary` be exercised end to end without an
//! external build toolchain to drive.

use prun_engine::{hash_output, RunContext, StepFailure, StepFunction, StepResult, StepSuccess};
use std::collections::HashMap;

fn ok(marker: &str) -> StepResult {
    Ok(StepSuccess {
        outputs_hash: Some(hash_output(marker)),
    })
}

fn preflight_contract_check(_ctx: &RunContext, step_id: &str) -> StepResult {
    ok(step_id)
}

fn phase_benchmark(_ctx: &RunContext, step_id: &str) -> StepResult {
    ok(step_id)
}

fn stage_data_layout(_ctx: &RunContext, step_id: &str) -> StepResult {
    ok(step_id)
}

fn build_steward_bundle(ctx: &RunContext, step_id: &str) -> StepResult {
    match ctx.artifacts.get("stage_data_layout") {
        Some(upstream_hash) => ok(&format!("{step_id}:{upstream_hash}")),
        None => Err(StepFailure {
            error_class: prun_core::ErrorClass::ContractInputMissing,
            reason: "stage_data_layout output not found in run context".to_string(),
        }),
    }
}

fn validate_bundle_quality(_ctx: &RunContext, step_id: &str) -> StepResult {
    ok(step_id)
}

fn build_minimal_deliverable(_ctx: &RunContext, step_id: &str) -> StepResult {
    ok(step_id)
}

fn verify_artifacts(_ctx: &RunContext, step_id: &str) -> StepResult {
    ok(step_id)
}

fn publish_internal(_ctx: &RunContext, step_id: &str) -> StepResult {
    ok(step_id)
}

/// Builds the `step_id -> StepFunction` map for [`prun_core::default_pipeline_steps`].
pub fn default_step_functions() -> HashMap<String, StepFunction> {
    let mut functions: HashMap<String, StepFunction> = HashMap::new();
    functions.insert(
        "preflight_contract_check".to_string(),
        Box::new(preflight_contract_check),
    );
    functions.insert("phase_benchmark".to_string(), Box::new(phase_benchmark));
    functions.insert(
        "stage_data_layout".to_string(),
        Box::new(stage_data_layout),
    );
    functions.insert(
        "build_steward_bundle".to_string(),
        Box::new(build_steward_bundle),
    );
    functions.insert(
        "validate_bundle_quality".to_string(),
        Box::new(validate_bundle_quality),
    );
    functions.insert(
        "build_minimal_deliverable".to_string(),
        Box::new(build_minimal_deliverable),
    );
    functions.insert("verify_artifacts".to_string(), Box::new(verify_artifacts));
    functions.insert("publish_internal".to_string(), Box::new(publish_internal));
    functions
}

#[cfg(test)]
mod tests {
    use super::*;
    use prun_core::RunState;

    #[test]
    fn covers_every_default_step() {
        let functions = default_step_functions();
        for step in prun_core::default_pipeline_steps() {
            assert!(
                functions.contains_key(&step.step_id),
                "missing step function for {}",
                step.step_id
            );
        }
    }

    #[test]
    fn build_steward_bundle_requires_upstream_artifact() {
        let ctx = RunContext::new("run-1", RunState::Executing);
        let result = build_steward_bundle(&ctx, "build_steward_bundle");
        assert!(result.is_err());
    }

    #[test]
    fn build_steward_bundle_succeeds_with_upstream_artifact() {
        let mut ctx = RunContext::new("run-1", RunState::Executing);
        ctx.artifacts
            .insert("stage_data_layout".to_string(), "deadbeef".to_string());
        let result = build_steward_bundle(&ctx, "build_steward_bundle");
        assert!(result.is_ok());
    }
}
