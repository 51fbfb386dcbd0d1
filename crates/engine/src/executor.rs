// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-threaded, fail-closed pipeline execution.
//!
//! No step runs concurrently with another: the executor walks the DAG in
//! declared order, retries in place, and returns control to the caller only
//! once the run has reached a [`RunState`] the caller asked for (or a
//! terminal one). Retry backoff is a real sleep on the calling thread,
//! substituted for an instant no-op by [`FakeClock`] under test.

use crate::state_machine::{PipelineDag, RetryPolicy, RunStateMachine};
use prun_core::{Clock, ErrorClass, IdGen, RunState, StepDefinition, StepState};
use prun_storage::EventLog;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::RuntimeError;

/// Runtime state for one run: the mutable counterpart to the immutable
/// [`PipelineDag`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    pub run_id: String,
    pub run_state: RunState,
    pub step_states: HashMap<String, StepState>,
    pub step_attempts: HashMap<String, u32>,
    pub completed_steps: HashSet<String>,
    pub failed_hard_gates: HashSet<String>,
    pub artifacts: HashMap<String, String>,
}

impl RunContext {
    pub fn new(run_id: impl Into<String>, run_state: RunState) -> Self {
        Self {
            run_id: run_id.into(),
            run_state,
            step_states: HashMap::new(),
            step_attempts: HashMap::new(),
            completed_steps: HashSet::new(),
            failed_hard_gates: HashSet::new(),
            artifacts: HashMap::new(),
        }
    }

    pub fn initialize_steps(&mut self, step_ids: &[String]) {
        for step_id in step_ids {
            self.step_states
                .entry(step_id.clone())
                .or_insert(StepState::Pending);
            self.step_attempts.entry(step_id.clone()).or_insert(0);
        }
    }

    pub fn can_run_step(&self, step_id: &str, dag: &PipelineDag) -> (bool, Option<String>) {
        dag.can_execute_step(step_id, &self.completed_steps, &self.failed_hard_gates)
    }
}

/// The outcome a step callable reports on success.
#[derive(Debug, Clone, Default)]
pub struct StepSuccess {
    pub outputs_hash: Option<String>,
}

/// The outcome a step callable reports on failure.
#[derive(Debug, Clone)]
pub struct StepFailure {
    pub error_class: ErrorClass,
    pub reason: String,
}

pub type StepResult = Result<StepSuccess, StepFailure>;

/// A step's implementation: given the run context and its own step id,
/// perform the work and report success or a classified failure. Boxed so a
/// pipeline can mix closures and function pointers in the same map.
pub type StepFunction = Box<dyn Fn(&RunContext, &str) -> StepResult + Send + Sync>;

/// Truncated sha256 used to fingerprint step outputs for `outputs_hash`.
pub fn hash_output(data: &str) -> String {
    let digest = Sha256::digest(data.as_bytes());
    format!("{digest:x}")[..16].to_string()
}

/// Executes individual steps with retry, hard-gate short-circuiting, and
/// event emission. Holds no state across calls beyond the event log handle
/// and the step implementations it was built with.
pub struct StepExecutor<I: IdGen, C: Clock> {
    event_log: EventLog,
    step_functions: HashMap<String, StepFunction>,
    ids: I,
    clock: C,
}

impl<I: IdGen, C: Clock> StepExecutor<I, C> {
    pub fn new(
        event_log: EventLog,
        step_functions: HashMap<String, StepFunction>,
        ids: I,
        clock: C,
    ) -> Self {
        Self {
            event_log,
            step_functions,
            ids,
            clock,
        }
    }

    /// Run `step` to completion: success, a non-retryable failure, or a
    /// hard-gate failure. Retries happen in this call; it returns only once
    /// the step has reached a terminal per-attempt outcome.
    pub fn execute_step(
        &self,
        ctx: &mut RunContext,
        step: &StepDefinition,
    ) -> Result<bool, RuntimeError> {
        let Some(step_func) = self.step_functions.get(&step.step_id) else {
            self.emit_and_fail(ctx, step, ErrorClass::Unknown, "no implementation for step")?;
            return Ok(false);
        };

        loop {
            let attempt = *ctx.step_attempts.get(&step.step_id).unwrap_or(&0);

            let event = prun_core::event::step_started(
                &self.ids,
                &self.clock,
                &ctx.run_id,
                &step.step_id,
                attempt,
            );
            self.event_log.append(&event)?;
            ctx.step_states
                .insert(step.step_id.clone(), StepState::Running);

            match step_func(ctx, &step.step_id) {
                Ok(success) => {
                    let event = prun_core::event::step_succeeded(
                        &self.ids,
                        &self.clock,
                        &ctx.run_id,
                        &step.step_id,
                        attempt,
                        success.outputs_hash.clone(),
                    );
                    self.event_log.append(&event)?;
                    ctx.step_states
                        .insert(step.step_id.clone(), StepState::Succeeded);
                    ctx.completed_steps.insert(step.step_id.clone());
                    if let Some(hash) = success.outputs_hash {
                        ctx.artifacts.insert(step.step_id.clone(), hash);
                    }
                    return Ok(true);
                }
                Err(failure) => {
                    let event = prun_core::event::step_failed(
                        &self.ids,
                        &self.clock,
                        &ctx.run_id,
                        &step.step_id,
                        failure.error_class,
                        &failure.reason,
                        attempt,
                    );
                    self.event_log.append(&event)?;

                    if step.is_hard_gate {
                        let gate_event = prun_core::event::gate_failed(
                            &self.ids,
                            &self.clock,
                            &ctx.run_id,
                            &step.step_id,
                            failure.error_class,
                            &failure.reason,
                        );
                        self.event_log.append(&gate_event)?;
                        ctx.failed_hard_gates.insert(step.step_id.clone());
                        ctx.step_states
                            .insert(step.step_id.clone(), StepState::Failed);
                        return Ok(false);
                    }

                    if RetryPolicy::allows_retry(step, failure.error_class, attempt) {
                        let new_attempt = attempt + 1;
                        ctx.step_attempts
                            .insert(step.step_id.clone(), new_attempt);

                        let retry_event = prun_core::event::step_retried(
                            &self.ids,
                            &self.clock,
                            &ctx.run_id,
                            &step.step_id,
                            new_attempt,
                            &format!("retrying after {}", failure.error_class),
                        );
                        self.event_log.append(&retry_event)?;

                        let delay = RetryPolicy::backoff_seconds(
                            attempt,
                            crate::state_machine::DEFAULT_BACKOFF_BASE_SECS,
                            crate::state_machine::DEFAULT_BACKOFF_MAX_SECS,
                        );
                        self.clock.sleep(Duration::from_secs_f64(delay));
                        continue;
                    }

                    ctx.step_states
                        .insert(step.step_id.clone(), StepState::Failed);
                    return Ok(false);
                }
            }
        }
    }

    fn emit_and_fail(
        &self,
        ctx: &mut RunContext,
        step: &StepDefinition,
        error_class: ErrorClass,
        reason: &str,
    ) -> Result<(), RuntimeError> {
        let attempt = *ctx.step_attempts.get(&step.step_id).unwrap_or(&0);
        let event = prun_core::event::step_failed(
            &self.ids,
            &self.clock,
            &ctx.run_id,
            &step.step_id,
            error_class,
            reason,
            attempt,
        );
        self.event_log.append(&event)?;
        ctx.step_states
            .insert(step.step_id.clone(), StepState::Failed);
        Ok(())
    }
}

/// Orchestrates a full run: the DAG walk, run-state transitions, and the
/// terminal `run.completed` event.
pub struct PipelineExecutor<I: IdGen, C: Clock> {
    dag: PipelineDag,
    step_executor: StepExecutor<I, C>,
    event_log: EventLog,
    ids: I,
    clock: C,
}

impl<I: IdGen, C: Clock> PipelineExecutor<I, C> {
    pub fn new(
        event_log: EventLog,
        step_functions: HashMap<String, StepFunction>,
        pipeline_steps: Vec<StepDefinition>,
        ids: I,
        clock: C,
    ) -> Self {
        let dag = PipelineDag::new(pipeline_steps);
        let step_executor = StepExecutor::new(event_log.clone(), step_functions, ids.clone(), clock.clone());
        Self {
            dag,
            step_executor,
            event_log,
            ids,
            clock,
        }
    }

    pub fn dag(&self) -> &PipelineDag {
        &self.dag
    }

    /// Create a new run: emits `run.created` and returns an initialized,
    /// `CREATED`-state context with every step `PENDING`.
    pub fn start(&self, run_id: &str, reason: Option<String>) -> Result<RunContext, RuntimeError> {
        let event = prun_core::event::run_created(&self.ids, &self.clock, run_id, reason);
        self.event_log.append(&event)?;

        let mut ctx = RunContext::new(run_id, RunState::Created);
        ctx.initialize_steps(self.dag.order());
        Ok(ctx)
    }

    /// Drive a freshly-started run through preflight, execution, and either
    /// `SUCCEEDED`, `FAILED`, or `BLOCKED` (on reaching a manual-gated step).
    pub fn execute(&self, ctx: &mut RunContext) -> Result<RunState, RuntimeError> {
        self.transition_run_state(
            ctx,
            RunState::PreflightValidated,
            Some("pre-execution validation passed".to_string()),
        )?;
        self.transition_run_state(ctx, RunState::Executing, None)?;

        self.walk_dag(ctx, 0, None)
    }

    /// Resume a reconstructed context: advance its run state into
    /// `EXECUTING` if needed, find the first non-terminal step (or accept an
    /// explicit `start_from`), and continue the DAG walk from there.
    ///
    /// `manual_override`, when true, approves exactly the resume point: if
    /// that step is manual-gated, it runs this time instead of re-blocking.
    /// This never writes an override event (see §9 of the design notes —
    /// `run.override_applied` is reserved, unemitted vocabulary); it is
    /// purely this call's decision about whether a human already approved
    /// the step it is about to re-enter.
    pub fn resume(
        &self,
        ctx: &mut RunContext,
        start_from: Option<&str>,
        manual_override: bool,
    ) -> Result<RunState, RuntimeError> {
        match ctx.run_state {
            RunState::Created => {
                self.transition_run_state(
                    ctx,
                    RunState::PreflightValidated,
                    Some("resume: validation passed".to_string()),
                )?;
                self.transition_run_state(ctx, RunState::Executing, Some("resume execution".to_string()))?;
            }
            RunState::PreflightValidated => {
                self.transition_run_state(ctx, RunState::Executing, Some("resume execution".to_string()))?;
            }
            RunState::Failed => {
                self.transition_run_state(
                    ctx,
                    RunState::Executing,
                    Some("resume after transient failure".to_string()),
                )?;
            }
            RunState::Blocked => {
                self.transition_run_state(
                    ctx,
                    RunState::Executing,
                    Some("resume after manual action".to_string()),
                )?;
            }
            RunState::Executing | RunState::Succeeded | RunState::RolledBack => {}
        }

        let resume_point = match start_from {
            Some(s) => Some(s.to_string()),
            None => self.dag.order().iter().find(|step_id| {
                !matches!(
                    ctx.step_states.get(*step_id),
                    Some(StepState::Succeeded) | Some(StepState::Skipped)
                )
            }).cloned(),
        };

        let Some(resume_point) = resume_point else {
            self.complete_run(ctx, RunState::Succeeded, "all steps already complete (resume)")?;
            return Ok(ctx.run_state);
        };

        let start_idx = self
            .dag
            .order()
            .iter()
            .position(|s| s == &resume_point)
            .unwrap_or(0);

        let override_step = manual_override.then_some(resume_point.as_str());
        self.walk_dag(ctx, start_idx, override_step)
    }

    /// Shared DAG walk used by both `execute` (from the top) and `resume`
    /// (from the resume point). Stops early on a hard-gate failure (run
    /// ends `FAILED`) or on reaching a pending manual-gated step that isn't
    /// the approved `manual_override_step` (run ends `BLOCKED`).
    fn walk_dag(
        &self,
        ctx: &mut RunContext,
        start_idx: usize,
        manual_override_step: Option<&str>,
    ) -> Result<RunState, RuntimeError> {
        for step_id in self.dag.order()[start_idx..].to_vec() {
            let Some(step) = self.dag.get_step(&step_id).cloned() else {
                continue;
            };

            ctx.step_states.entry(step_id.clone()).or_insert(StepState::Pending);
            ctx.step_attempts.entry(step_id.clone()).or_insert(0);

            if ctx.step_states.get(&step_id) == Some(&StepState::Succeeded) {
                continue;
            }

            let (can_run, _reason) = ctx.can_run_step(&step_id, &self.dag);
            if !can_run {
                ctx.step_states.insert(step_id.clone(), StepState::Skipped);
                continue;
            }

            if step.is_manual_gated && manual_override_step != Some(step_id.as_str()) {
                self.block_run(ctx, &format!("awaiting manual action on step: {step_id}"))?;
                return Ok(ctx.run_state);
            }

            if ctx.step_states.get(&step_id) == Some(&StepState::Failed) {
                ctx.step_states.insert(step_id.clone(), StepState::Pending);
            }

            let succeeded = self.step_executor.execute_step(ctx, &step)?;
            if !succeeded && step.is_hard_gate {
                self.skip_downstream(ctx, &step_id);
                self.fail_run(ctx, &format!("hard gate failed: {step_id}"))?;
                return Ok(ctx.run_state);
            }
        }

        self.finish_after_walk(ctx)?;
        Ok(ctx.run_state)
    }

    /// Pause the run for a manual-gated step. `BLOCKED` is not terminal, so
    /// unlike `fail_run`/`complete_run` this does not emit `run.completed`.
    fn block_run(&self, ctx: &mut RunContext, reason: &str) -> Result<(), RuntimeError> {
        if ctx.run_state != RunState::Blocked {
            self.transition_run_state(ctx, RunState::Blocked, Some(reason.to_string()))?;
        }
        Ok(())
    }

    fn skip_downstream(&self, ctx: &mut RunContext, step_id: &str) {
        for ds in self.dag.get_downstream_steps(step_id) {
            if ctx.step_states.get(&ds) == Some(&StepState::Pending) {
                ctx.step_states.insert(ds, StepState::Skipped);
            }
        }
    }

    fn finish_after_walk(&self, ctx: &mut RunContext) -> Result<(), RuntimeError> {
        if !ctx.failed_hard_gates.is_empty() {
            let gates: Vec<&str> = ctx.failed_hard_gates.iter().map(|s| s.as_str()).collect();
            self.fail_run(ctx, &format!("hard gate failures: {}", gates.join(", ")))?;
        } else {
            self.complete_run(ctx, RunState::Succeeded, "all steps succeeded")?;
        }
        Ok(())
    }

    fn transition_run_state(
        &self,
        ctx: &mut RunContext,
        new_state: RunState,
        reason: Option<String>,
    ) -> Result<(), RuntimeError> {
        RunStateMachine::validate_transition(ctx.run_state, new_state)?;
        let event = prun_core::event::run_state_changed(
            &self.ids,
            &self.clock,
            &ctx.run_id,
            ctx.run_state,
            new_state,
            reason,
        );
        self.event_log.append(&event)?;
        info!(run_id = %ctx.run_id, from = %ctx.run_state, to = %new_state, "run state transition");
        ctx.run_state = new_state;
        Ok(())
    }

    fn fail_run(&self, ctx: &mut RunContext, reason: &str) -> Result<(), RuntimeError> {
        if ctx.run_state != RunState::Failed {
            self.transition_run_state(ctx, RunState::Failed, Some(reason.to_string()))?;
        }
        warn!(run_id = %ctx.run_id, reason, "run failed");
        let event = prun_core::event::run_completed(
            &self.ids,
            &self.clock,
            &ctx.run_id,
            RunState::Failed,
            Some(reason.to_string()),
        );
        self.event_log.append(&event)?;
        Ok(())
    }

    fn complete_run(
        &self,
        ctx: &mut RunContext,
        final_state: RunState,
        reason: &str,
    ) -> Result<(), RuntimeError> {
        if ctx.run_state != final_state {
            self.transition_run_state(ctx, final_state, Some(reason.to_string()))?;
        }
        let event = prun_core::event::run_completed(
            &self.ids,
            &self.clock,
            &ctx.run_id,
            final_state,
            Some(reason.to_string()),
        );
        self.event_log.append(&event)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
