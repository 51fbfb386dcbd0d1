// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Internal runner errors.
//!
//! These are distinct from step failures: a step failing is expected,
//! recorded behavior that flows through the event log as `step.failed`. A
//! [`RuntimeError`] means the runner itself could not make progress —
//! a malformed DAG, an illegal state transition, a corrupt log — and is
//! never written into the log as if it were a step outcome.

use prun_core::{RunState, StepState};
use prun_storage::EventLogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("unknown step: {0}")]
    UnknownStep(String),

    #[error("illegal run state transition: {from} -> {to}")]
    IllegalRunTransition { from: RunState, to: RunState },

    #[error("illegal step state transition for {step_id}: {from} -> {to}")]
    IllegalStepTransition {
        step_id: String,
        from: StepState,
        to: StepState,
    },

    #[error("run is already in a terminal state: {0}")]
    RunTerminal(RunState),

    #[error("cannot resume run: {0}")]
    ResumeRejected(String),

    #[error("event log is empty, nothing to reconstruct")]
    EmptyLog,

    #[error("first event must be run.created, got {0}")]
    FirstEventNotRunCreated(String),

    #[error("event log error: {0}")]
    EventLog(#[from] EventLogError),
}
