// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! prun-engine: state machines, retry policy, DAG gating, the step and
//! pipeline executors, reconstruction, resume, and run summaries.

pub mod error;
pub mod executor;
pub mod reconstruct;
pub mod state_machine;
pub mod summary;

pub use error::RuntimeError;
pub use executor::{
    hash_output, PipelineExecutor, RunContext, StepExecutor, StepFailure, StepFunction,
    StepResult, StepSuccess,
};
pub use reconstruct::{ResumeGuard, RunReconstructor};
pub use state_machine::{
    PipelineDag, RetryPolicy, RunStateMachine, StepStateMachine, DEFAULT_BACKOFF_BASE_SECS,
    DEFAULT_BACKOFF_MAX_SECS,
};
pub use summary::{RunSummary, StepSummary, SummaryGenerator};
