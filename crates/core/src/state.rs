// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run and step state machines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an entire run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Created,
    PreflightValidated,
    Executing,
    Blocked,
    Failed,
    Succeeded,
    RolledBack,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Created => "CREATED",
            RunState::PreflightValidated => "PREFLIGHT_VALIDATED",
            RunState::Executing => "EXECUTING",
            RunState::Blocked => "BLOCKED",
            RunState::Failed => "FAILED",
            RunState::Succeeded => "SUCCEEDED",
            RunState::RolledBack => "ROLLED_BACK",
        }
    }

    /// A run in a terminal state never transitions again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Succeeded | RunState::RolledBack)
    }

    /// Parses the `SCREAMING_SNAKE_CASE` wire form written into `new_state`/
    /// `previous_state` event fields.
    pub fn from_wire_str(s: &str) -> Option<RunState> {
        match s {
            "CREATED" => Some(RunState::Created),
            "PREFLIGHT_VALIDATED" => Some(RunState::PreflightValidated),
            "EXECUTING" => Some(RunState::Executing),
            "BLOCKED" => Some(RunState::Blocked),
            "FAILED" => Some(RunState::Failed),
            "SUCCEEDED" => Some(RunState::Succeeded),
            "ROLLED_BACK" => Some(RunState::RolledBack),
            _ => None,
        }
    }

    /// Returns `true` if `self -> next` is a legal run-state transition.
    pub fn can_transition(&self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Created, PreflightValidated)
                | (Created, Failed)
                | (PreflightValidated, Executing)
                | (PreflightValidated, Failed)
                | (Executing, Blocked)
                | (Executing, Failed)
                | (Executing, Succeeded)
                | (Blocked, Executing)
                | (Blocked, Failed)
                | (Blocked, RolledBack)
                | (Failed, RolledBack)
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a single step within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Compensated,
    Skipped,
}

impl StepState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepState::Pending => "PENDING",
            StepState::Running => "RUNNING",
            StepState::Succeeded => "SUCCEEDED",
            StepState::Failed => "FAILED",
            StepState::Compensated => "COMPENSATED",
            StepState::Skipped => "SKIPPED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepState::Succeeded | StepState::Compensated | StepState::Skipped
        )
    }

    /// Returns `true` if `self -> next` is a legal step-state transition.
    pub fn can_transition(&self, next: StepState) -> bool {
        use StepState::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Pending, Skipped)
                | (Running, Succeeded)
                | (Running, Failed)
                | (Failed, Running)
                | (Failed, Compensated)
        )
    }
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who or what initiated an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    /// The runner itself, acting autonomously.
    Runner,
    /// A human operator, e.g. approving a manual-gated step or forcing resume.
    Manual,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Actor::Runner => "runner",
            Actor::Manual => "manual",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
