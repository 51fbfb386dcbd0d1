// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event record and its constructor helpers.
//!
//! Unlike a per-variant payload enum, this is a single flat, sparse struct:
//! every event carries the same fields, and fields that don't apply to a
//! given `event_type` are left `None` and dropped from the wire form by
//! `#[serde(skip_serializing_if = "Option::is_none")]`. That keeps the JSONL
//! compact and keeps downstream readers (including the reconstruction path)
//! from needing a tagged-union match per event kind.

use crate::clock::Clock;
use crate::error_class::ErrorClass;
use crate::id::IdGen;
use crate::state::{Actor, RunState, StepState};
use serde::{Deserialize, Serialize};

/// Discriminates what happened; see the constructor functions below for the
/// field combination each variant populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "run.created")]
    RunCreated,
    #[serde(rename = "run.state_changed")]
    RunStateChanged,
    #[serde(rename = "step.started")]
    StepStarted,
    #[serde(rename = "step.succeeded")]
    StepSucceeded,
    #[serde(rename = "step.failed")]
    StepFailed,
    #[serde(rename = "step.retried")]
    StepRetried,
    #[serde(rename = "step.compensated")]
    StepCompensated,
    #[serde(rename = "artifact.emitted")]
    ArtifactEmitted,
    #[serde(rename = "gate.failed")]
    GateFailed,
    #[serde(rename = "run.completed")]
    RunCompleted,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::RunCreated => "run.created",
            EventType::RunStateChanged => "run.state_changed",
            EventType::StepStarted => "step.started",
            EventType::StepSucceeded => "step.succeeded",
            EventType::StepFailed => "step.failed",
            EventType::StepRetried => "step.retried",
            EventType::StepCompensated => "step.compensated",
            EventType::ArtifactEmitted => "artifact.emitted",
            EventType::GateFailed => "gate.failed",
            EventType::RunCompleted => "run.completed",
        }
    }
}

/// A single append-only log record. Every field present on the wire is
/// semantically relevant to that record's `event_type`; absent optional
/// fields are simply omitted rather than written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub event_type: EventType,
    pub run_id: String,
    pub timestamp_utc: String,
    pub actor: Actor,
    #[serde(default)]
    pub attempt: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_class: Option<ErrorClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_state: Option<String>,
    /// Reserved for `run.override_applied`; no constructor in this module
    /// populates it yet (see SPEC_FULL.md's notes on unexercised vocabulary).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_reason: Option<String>,
}

/// Builds events stamped with an ID generator and clock, mirroring the
/// `event_id`/`timestamp_utc` stamping every constructor in this module
/// performs by hand in the original runner.
struct Stamp<'a, I: IdGen, C: Clock> {
    ids: &'a I,
    clock: &'a C,
}

impl<'a, I: IdGen, C: Clock> Stamp<'a, I, C> {
    fn blank(&self, run_id: &str, event_type: EventType, actor: Actor) -> Event {
        Event {
            event_id: self.ids.next(),
            event_type,
            run_id: run_id.to_string(),
            timestamp_utc: self.clock.now_utc().to_rfc3339(),
            actor,
            attempt: 0,
            step_id: None,
            error_class: None,
            reason: None,
            inputs_hash: None,
            outputs_hash: None,
            artifact_path: None,
            previous_state: None,
            new_state: None,
            override_reason: None,
        }
    }
}

pub fn run_created<I: IdGen, C: Clock>(
    ids: &I,
    clock: &C,
    run_id: &str,
    reason: Option<String>,
) -> Event {
    let stamp = Stamp { ids, clock };
    let mut event = stamp.blank(run_id, EventType::RunCreated, Actor::Runner);
    event.new_state = Some(RunState::Created.as_str().to_string());
    event.reason = reason;
    event
}

pub fn run_state_changed<I: IdGen, C: Clock>(
    ids: &I,
    clock: &C,
    run_id: &str,
    previous_state: RunState,
    new_state: RunState,
    reason: Option<String>,
) -> Event {
    let stamp = Stamp { ids, clock };
    let mut event = stamp.blank(run_id, EventType::RunStateChanged, Actor::Runner);
    event.previous_state = Some(previous_state.as_str().to_string());
    event.new_state = Some(new_state.as_str().to_string());
    event.reason = reason;
    event
}

pub fn step_started<I: IdGen, C: Clock>(
    ids: &I,
    clock: &C,
    run_id: &str,
    step_id: &str,
    attempt: u32,
) -> Event {
    let stamp = Stamp { ids, clock };
    let mut event = stamp.blank(run_id, EventType::StepStarted, Actor::Runner);
    event.step_id = Some(step_id.to_string());
    event.attempt = attempt;
    event.new_state = Some(StepState::Running.as_str().to_string());
    event
}

pub fn step_succeeded<I: IdGen, C: Clock>(
    ids: &I,
    clock: &C,
    run_id: &str,
    step_id: &str,
    attempt: u32,
    outputs_hash: Option<String>,
) -> Event {
    let stamp = Stamp { ids, clock };
    let mut event = stamp.blank(run_id, EventType::StepSucceeded, Actor::Runner);
    event.step_id = Some(step_id.to_string());
    event.attempt = attempt;
    event.new_state = Some(StepState::Succeeded.as_str().to_string());
    event.outputs_hash = outputs_hash;
    event
}

#[allow(clippy::too_many_arguments)]
pub fn step_failed<I: IdGen, C: Clock>(
    ids: &I,
    clock: &C,
    run_id: &str,
    step_id: &str,
    error_class: ErrorClass,
    reason: &str,
    attempt: u32,
) -> Event {
    let stamp = Stamp { ids, clock };
    let mut event = stamp.blank(run_id, EventType::StepFailed, Actor::Runner);
    event.step_id = Some(step_id.to_string());
    event.attempt = attempt;
    event.error_class = Some(error_class);
    event.reason = Some(reason.to_string());
    event.new_state = Some(StepState::Failed.as_str().to_string());
    event
}

pub fn step_retried<I: IdGen, C: Clock>(
    ids: &I,
    clock: &C,
    run_id: &str,
    step_id: &str,
    attempt: u32,
    reason: &str,
) -> Event {
    let stamp = Stamp { ids, clock };
    let mut event = stamp.blank(run_id, EventType::StepRetried, Actor::Runner);
    event.step_id = Some(step_id.to_string());
    event.attempt = attempt;
    event.reason = Some(reason.to_string());
    event
}

pub fn step_compensated<I: IdGen, C: Clock>(
    ids: &I,
    clock: &C,
    run_id: &str,
    step_id: &str,
    reason: Option<String>,
) -> Event {
    let stamp = Stamp { ids, clock };
    let mut event = stamp.blank(run_id, EventType::StepCompensated, Actor::Manual);
    event.step_id = Some(step_id.to_string());
    event.new_state = Some(StepState::Compensated.as_str().to_string());
    event.reason = reason;
    event
}

pub fn gate_failed<I: IdGen, C: Clock>(
    ids: &I,
    clock: &C,
    run_id: &str,
    step_id: &str,
    error_class: ErrorClass,
    reason: &str,
) -> Event {
    let stamp = Stamp { ids, clock };
    let mut event = stamp.blank(run_id, EventType::GateFailed, Actor::Runner);
    event.step_id = Some(step_id.to_string());
    event.error_class = Some(error_class);
    event.reason = Some(reason.to_string());
    event
}

pub fn artifact_emitted<I: IdGen, C: Clock>(
    ids: &I,
    clock: &C,
    run_id: &str,
    step_id: &str,
    artifact_path: &str,
    outputs_hash: Option<String>,
) -> Event {
    let stamp = Stamp { ids, clock };
    let mut event = stamp.blank(run_id, EventType::ArtifactEmitted, Actor::Runner);
    event.step_id = Some(step_id.to_string());
    event.artifact_path = Some(artifact_path.to_string());
    event.outputs_hash = outputs_hash;
    event
}

pub fn run_completed<I: IdGen, C: Clock>(
    ids: &I,
    clock: &C,
    run_id: &str,
    final_state: RunState,
    reason: Option<String>,
) -> Event {
    let stamp = Stamp { ids, clock };
    let mut event = stamp.blank(run_id, EventType::RunCompleted, Actor::Runner);
    event.new_state = Some(final_state.as_str().to_string());
    event.reason = reason;
    event
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
