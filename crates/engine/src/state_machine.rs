// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transition guards and the retry policy.

use crate::error::RuntimeError;
use prun_core::{ErrorClass, RunState, StepDefinition, StepState};
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Validates run-level transitions against the fail-closed transition table
/// (see [`prun_core::state::RunState::can_transition`]).
pub struct RunStateMachine;

impl RunStateMachine {
    pub fn can_transition(current: RunState, target: RunState) -> bool {
        current.can_transition(target)
    }

    pub fn validate_transition(current: RunState, target: RunState) -> Result<(), RuntimeError> {
        if Self::can_transition(current, target) {
            Ok(())
        } else {
            Err(RuntimeError::IllegalRunTransition {
                from: current,
                to: target,
            })
        }
    }
}

/// Validates step-level transitions.
pub struct StepStateMachine;

impl StepStateMachine {
    pub fn can_transition(current: StepState, target: StepState) -> bool {
        current.can_transition(target)
    }

    pub fn validate_transition(
        step_id: &str,
        current: StepState,
        target: StepState,
    ) -> Result<(), RuntimeError> {
        if Self::can_transition(current, target) {
            Ok(())
        } else {
            Err(RuntimeError::IllegalStepTransition {
                step_id: step_id.to_string(),
                from: current,
                to: target,
            })
        }
    }
}

/// Retry eligibility (R1/R2/R3) and exponential backoff with jitter.
pub struct RetryPolicy;

impl RetryPolicy {
    /// R1: a hard-gate step that failed with `HARD_GATE_FAILED` never
    /// retries, regardless of its own retry budget. R3: a hard-gated step
    /// *can* still retry a `TRANSIENT_IO` failure. R2: otherwise, retry iff
    /// the step's own policy allows this error class at this attempt count.
    pub fn allows_retry(
        step: &StepDefinition,
        error_class: ErrorClass,
        current_attempt: u32,
    ) -> bool {
        if step.is_hard_gate && error_class == ErrorClass::HardGateFailed {
            return false;
        }
        step.allows_retry(error_class, current_attempt)
    }

    /// `delay = min(base * 2^attempt, max_delay) + U(0, 0.1 * delay)`.
    pub fn backoff_seconds(attempt: u32, base: f64, max_delay: f64) -> f64 {
        let delay = (base * 2f64.powi(attempt as i32)).min(max_delay);
        let jitter = rand::thread_rng().gen_range(0.0..=delay * 0.1);
        delay + jitter
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self
    }
}

/// Default backoff parameters: 2s base, 60s cap.
pub const DEFAULT_BACKOFF_BASE_SECS: f64 = 2.0;
pub const DEFAULT_BACKOFF_MAX_SECS: f64 = 60.0;

/// The declared, ordered step DAG: step *i* depends on every step before it.
pub struct PipelineDag {
    steps: HashMap<String, StepDefinition>,
    order: Vec<String>,
}

impl PipelineDag {
    pub fn new(steps: Vec<StepDefinition>) -> Self {
        let order = steps.iter().map(|s| s.step_id.clone()).collect();
        let steps = steps.into_iter().map(|s| (s.step_id.clone(), s)).collect();
        Self { steps, order }
    }

    pub fn get_step(&self, step_id: &str) -> Option<&StepDefinition> {
        self.steps.get(step_id)
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn get_upstream_steps(&self, step_id: &str) -> Vec<String> {
        match self.order.iter().position(|s| s == step_id) {
            Some(idx) => self.order[..idx].to_vec(),
            None => Vec::new(),
        }
    }

    pub fn get_downstream_steps(&self, step_id: &str) -> Vec<String> {
        match self.order.iter().position(|s| s == step_id) {
            Some(idx) => self.order[idx + 1..].to_vec(),
            None => Vec::new(),
        }
    }

    /// Fail-closed gating: a step may run only if every upstream step has
    /// completed and no upstream hard gate has failed. Returns the reason
    /// a step is blocked, if it is.
    pub fn can_execute_step(
        &self,
        step_id: &str,
        completed_steps: &HashSet<String>,
        failed_hard_gates: &HashSet<String>,
    ) -> (bool, Option<String>) {
        if self.get_step(step_id).is_none() {
            return (false, Some(format!("unknown step: {step_id}")));
        }

        let upstream: HashSet<String> = self.get_upstream_steps(step_id).into_iter().collect();

        let blocked_by: Vec<&String> = upstream.intersection(failed_hard_gates).collect();
        if !blocked_by.is_empty() {
            return (
                false,
                Some(format!(
                    "blocked by failed hard gate(s): {}",
                    blocked_by
                        .iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
            );
        }

        let missing: Vec<&String> = upstream.difference(completed_steps).collect();
        if !missing.is_empty() {
            return (
                false,
                Some(format!(
                    "missing upstream dependencies: {}",
                    missing
                        .iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
            );
        }

        (true, None)
    }
}

#[cfg(test)]
#[path = "state_machine_tests.rs"]
mod tests;
