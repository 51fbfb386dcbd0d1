// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rebuilding a [`RunContext`] by replaying the event log, and the guard
//! that decides whether the result is safe to resume.

use crate::error::RuntimeError;
use crate::executor::RunContext;
use crate::state_machine::PipelineDag;
use prun_core::{Event, EventType, RunState, StepState};
use prun_storage::EventLog;

/// Replays an event log into a [`RunContext`]. Pure replay: no step runs,
/// no events are written, no clock is consulted.
pub struct RunReconstructor<'a> {
    event_log: &'a EventLog,
}

impl<'a> RunReconstructor<'a> {
    pub fn new(event_log: &'a EventLog) -> Self {
        Self { event_log }
    }

    /// Reconstruct full run state from the log, given the DAG's declared
    /// step order (every step starts `PENDING` before replay begins).
    pub fn reconstruct(&self, dag: &PipelineDag) -> Result<RunContext, RuntimeError> {
        let events = self.event_log.read_all()?;

        let first = events.first().ok_or(RuntimeError::EmptyLog)?;
        if first.event_type != EventType::RunCreated {
            return Err(RuntimeError::FirstEventNotRunCreated(
                first.event_type.as_str().to_string(),
            ));
        }

        let mut ctx = RunContext::new(first.run_id.clone(), RunState::Created);
        ctx.initialize_steps(dag.order());

        for event in &events {
            self.apply_event(&mut ctx, event);
        }

        Ok(ctx)
    }

    fn apply_event(&self, ctx: &mut RunContext, event: &Event) {
        match event.event_type {
            EventType::RunStateChanged | EventType::RunCompleted => {
                if let Some(state) = event.new_state.as_deref().and_then(RunState::from_wire_str) {
                    ctx.run_state = state;
                }
            }
            EventType::StepStarted => {
                if let Some(step_id) = &event.step_id {
                    ctx.step_states
                        .insert(step_id.clone(), StepState::Running);
                    ctx.step_attempts.insert(step_id.clone(), event.attempt);
                }
            }
            EventType::StepSucceeded => {
                if let Some(step_id) = &event.step_id {
                    ctx.step_states
                        .insert(step_id.clone(), StepState::Succeeded);
                    ctx.completed_steps.insert(step_id.clone());
                    if let Some(hash) = &event.outputs_hash {
                        ctx.artifacts.insert(step_id.clone(), hash.clone());
                    }
                }
            }
            EventType::StepFailed => {
                if let Some(step_id) = &event.step_id {
                    ctx.step_states.insert(step_id.clone(), StepState::Failed);
                }
            }
            EventType::StepCompensated => {
                if let Some(step_id) = &event.step_id {
                    ctx.step_states
                        .insert(step_id.clone(), StepState::Compensated);
                }
            }
            EventType::GateFailed => {
                if let Some(step_id) = &event.step_id {
                    ctx.failed_hard_gates.insert(step_id.clone());
                }
            }
            EventType::StepRetried => {
                if let Some(step_id) = &event.step_id {
                    ctx.step_attempts.insert(step_id.clone(), event.attempt);
                    ctx.step_states
                        .insert(step_id.clone(), StepState::Pending);
                }
            }
            EventType::ArtifactEmitted | EventType::RunCreated => {}
        }
    }
}

/// Resume eligibility: terminal states never resume; a `FAILED` run only
/// resumes if no hard gate actually failed (pure transient failures can
/// still be retried).
pub struct ResumeGuard;

impl ResumeGuard {
    pub fn can_resume(ctx: &RunContext) -> (bool, Option<String>) {
        if ctx.run_state.is_terminal() {
            return (false, Some(format!("run in terminal state: {}", ctx.run_state)));
        }

        if ctx.run_state == RunState::Failed {
            if !ctx.failed_hard_gates.is_empty() {
                let gates: Vec<&str> = ctx.failed_hard_gates.iter().map(|s| s.as_str()).collect();
                return (
                    false,
                    Some(format!("hard gate failures block resume: {}", gates.join(", "))),
                );
            }
            return (true, None);
        }

        (true, None)
    }

    pub fn validate_resume(ctx: &RunContext) -> Result<(), RuntimeError> {
        let (can_resume, reason) = Self::can_resume(ctx);
        if can_resume {
            Ok(())
        } else {
            Err(RuntimeError::ResumeRejected(
                reason.unwrap_or_else(|| "unknown reason".to_string()),
            ))
        }
    }

    /// First non-terminal, non-skipped step, in DAG order.
    pub fn get_resume_point(ctx: &RunContext, dag: &PipelineDag) -> Option<String> {
        dag.order().iter().find_map(|step_id| {
            match ctx.step_states.get(step_id) {
                Some(StepState::Succeeded) | Some(StepState::Skipped) => None,
                Some(StepState::Pending) | Some(StepState::Failed) | None => {
                    Some(step_id.clone())
                }
                _ => None,
            }
        })
    }
}

#[cfg(test)]
#[path = "reconstruct_tests.rs"]
mod tests;
