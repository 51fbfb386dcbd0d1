// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human- and machine-readable summaries built by replaying the event log.
//!
//! This walks the log directly rather than going through
//! [`crate::reconstruct::RunReconstructor`]: a summary only needs the
//! per-step outcome and timing, not a resumable [`crate::executor::RunContext`].

use crate::error::RuntimeError;
use prun_core::{ErrorClass, RunState, StepState};
use prun_storage::EventLog;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct StepSummary {
    pub step_id: String,
    pub state: StepState,
    pub attempts: u32,
    pub error_class: Option<ErrorClass>,
    pub error_reason: Option<String>,
    pub started_at: Option<String>,
    pub duration_ms: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub final_state: RunState,
    pub created_at: String,
    pub completed_at: Option<String>,
    pub duration_ms: Option<i64>,
    pub steps: Vec<StepSummary>,
    pub completed_steps: u32,
    pub failed_steps: u32,
    pub skipped_steps: u32,
    pub failed_hard_gates: Vec<String>,
    pub total_attempts: u32,
    pub total_retries: u32,
}

impl RunSummary {
    /// Machine-readable form, matching the shape emitted by `prun summary --json`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "run_id": self.run_id,
            "final_state": self.final_state.as_str(),
            "created_at": self.created_at,
            "completed_at": self.completed_at,
            "duration_ms": self.duration_ms,
            "steps": self.steps.iter().map(|s| serde_json::json!({
                "step_id": s.step_id,
                "state": s.state.as_str(),
                "attempts": s.attempts,
                "error_class": s.error_class.map(|c| c.as_str()),
                "error_reason": s.error_reason,
                "duration_ms": s.duration_ms,
            })).collect::<Vec<_>>(),
            "stats": {
                "total_steps": self.steps.len(),
                "completed": self.completed_steps,
                "failed": self.failed_steps,
                "skipped": self.skipped_steps,
                "total_attempts": self.total_attempts,
                "total_retries": self.total_retries,
            },
            "failed_hard_gates": self.failed_hard_gates,
        })
    }

    /// Human-readable form for `prun summary` without `--json`.
    pub fn to_text(&self) -> String {
        let status_glyph = match self.final_state {
            RunState::Succeeded => "\u{2713}",
            RunState::Failed => "\u{2717}",
            RunState::RolledBack => "\u{21ba}",
            _ => "\u{2022}",
        };

        let mut lines = Vec::new();
        lines.push(format!("Run Summary: {}", self.run_id));
        lines.push("=".repeat(60));
        lines.push(format!(
            "Status: {status_glyph} {}",
            self.final_state.as_str()
        ));
        lines.push(format!("Created: {}", self.created_at));
        if let Some(completed_at) = &self.completed_at {
            lines.push(format!("Completed: {completed_at}"));
        }
        if let Some(duration_ms) = self.duration_ms {
            lines.push(format!("Duration: {:.2}s", duration_ms as f64 / 1000.0));
        }
        lines.push(String::new());
        lines.push(format!(
            "Steps: {} total ({} completed, {} failed, {} skipped)",
            self.steps.len(),
            self.completed_steps,
            self.failed_steps,
            self.skipped_steps
        ));
        lines.push(format!("Retries: {}", self.total_retries));
        if !self.failed_hard_gates.is_empty() {
            lines.push(format!(
                "Hard gate failures: {}",
                self.failed_hard_gates.join(", ")
            ));
        }
        lines.push(String::new());
        lines.push("Steps:".to_string());
        lines.push("-".repeat(60));

        for step in &self.steps {
            let glyph = match step.state {
                StepState::Succeeded => "\u{2713}",
                StepState::Failed => "\u{2717}",
                StepState::Skipped => "\u{2298}",
                StepState::Compensated => "\u{21ba}",
                _ => "\u{2022}",
            };
            let mut line = format!("  {glyph} {:<30} {}", step.step_id, step.state.as_str());
            if step.attempts > 1 {
                line.push_str(&format!(" (attempts: {})", step.attempts));
            }
            lines.push(line);
            if let Some(reason) = &step.error_reason {
                lines.push(format!("      Error: {reason}"));
            }
        }

        lines.join("\n")
    }
}

#[derive(Default)]
struct StepAccumulator {
    state: Option<StepState>,
    attempts: u32,
    error_class: Option<ErrorClass>,
    error_reason: Option<String>,
    started_at: Option<String>,
    terminal_at: Option<String>,
}

/// Builds a [`RunSummary`] by a single forward pass over the log.
///
/// The log alone cannot distinguish "not yet reached" from "skipped by a
/// fail-closed gate" for a step that never emitted a `step.started` (see
/// spec §4.5's I5 note: absence of the start event is itself the signal).
/// Passing the declared DAG order via [`Self::with_step_order`] lets
/// `generate` resolve that ambiguity once the run has reached a terminal
/// state: any declared step with no events at that point was skipped.
/// Without an order, only steps that appear in the log are summarized.
pub struct SummaryGenerator<'a> {
    event_log: &'a EventLog,
    step_order: Option<Vec<String>>,
}

impl<'a> SummaryGenerator<'a> {
    pub fn new(event_log: &'a EventLog) -> Self {
        Self {
            event_log,
            step_order: None,
        }
    }

    pub fn with_step_order(mut self, step_order: Vec<String>) -> Self {
        self.step_order = Some(step_order);
        self
    }

    pub fn generate(&self) -> Result<RunSummary, RuntimeError> {
        let events = self.event_log.read_all()?;
        let first = events.first().ok_or(RuntimeError::EmptyLog)?;

        let run_id = first.run_id.clone();
        let created_at = first.timestamp_utc.clone();
        let mut final_state = RunState::Created;
        let mut completed_at: Option<String> = None;

        let mut steps: BTreeMap<String, StepAccumulator> = BTreeMap::new();
        let mut gate_failures: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
        let mut retry_count = 0u32;

        for event in &events {
            use prun_core::EventType::*;
            match event.event_type {
                RunStateChanged | RunCompleted => {
                    if let Some(state) = event.new_state.as_deref().and_then(RunState::from_wire_str) {
                        final_state = state;
                    }
                    completed_at = Some(event.timestamp_utc.clone());
                }
                StepStarted => {
                    if let Some(step_id) = &event.step_id {
                        let entry = steps.entry(step_id.clone()).or_default();
                        entry.state = Some(StepState::Running);
                        entry.attempts = event.attempt;
                        entry.started_at = Some(event.timestamp_utc.clone());
                    }
                }
                StepSucceeded => {
                    if let Some(step_id) = &event.step_id {
                        let entry = steps.entry(step_id.clone()).or_default();
                        entry.state = Some(StepState::Succeeded);
                        entry.terminal_at = Some(event.timestamp_utc.clone());
                    }
                }
                StepFailed => {
                    if let Some(step_id) = &event.step_id {
                        let entry = steps.entry(step_id.clone()).or_default();
                        entry.state = Some(StepState::Failed);
                        entry.error_class = event.error_class;
                        entry.error_reason = event.reason.clone();
                        entry.terminal_at = Some(event.timestamp_utc.clone());
                    }
                }
                StepRetried => retry_count += 1,
                StepCompensated => {
                    if let Some(step_id) = &event.step_id {
                        let entry = steps.entry(step_id.clone()).or_default();
                        entry.state = Some(StepState::Compensated);
                        entry.terminal_at = Some(event.timestamp_utc.clone());
                    }
                }
                GateFailed => {
                    if let Some(step_id) = &event.step_id {
                        gate_failures.insert(step_id.clone());
                    }
                }
                ArtifactEmitted | RunCreated => {}
            }
        }

        if let Some(order) = &self.step_order {
            for step_id in order {
                steps.entry(step_id.clone()).or_default();
            }
        }

        let run_is_terminal = matches!(
            final_state,
            RunState::Succeeded | RunState::Failed | RunState::RolledBack
        );

        let mut completed_steps = 0u32;
        let mut failed_steps = 0u32;
        let mut skipped_steps = 0u32;
        let mut total_attempts = 0u32;
        let mut by_id: std::collections::HashMap<String, StepSummary> =
            std::collections::HashMap::with_capacity(steps.len());

        for (step_id, acc) in steps {
            let mut state = acc.state.unwrap_or(StepState::Pending);
            // A declared step with no events at all was never started. Once
            // the run has reached a terminal state, that absence is the
            // fail-closed skip signal (I5); mid-run it just hasn't run yet.
            if acc.state.is_none() && run_is_terminal {
                state = StepState::Skipped;
            }
            let attempts = if acc.state.is_some() { acc.attempts + 1 } else { 0 };
            total_attempts += attempts;
            match state {
                StepState::Succeeded => completed_steps += 1,
                StepState::Failed => failed_steps += 1,
                StepState::Skipped => skipped_steps += 1,
                _ => {}
            }
            let duration_ms = acc
                .started_at
                .as_deref()
                .zip(acc.terminal_at.as_deref())
                .and_then(|(start, end)| {
                    chrono::DateTime::parse_from_rfc3339(end)
                        .ok()
                        .zip(chrono::DateTime::parse_from_rfc3339(start).ok())
                        .map(|(end, start)| (end - start).num_milliseconds())
                });
            by_id.insert(
                step_id.clone(),
                StepSummary {
                    step_id,
                    state,
                    attempts,
                    error_class: acc.error_class,
                    error_reason: acc.error_reason,
                    started_at: acc.started_at,
                    duration_ms,
                },
            );
        }

        let step_summaries: Vec<StepSummary> = match &self.step_order {
            Some(order) => {
                let mut ordered: Vec<StepSummary> = order
                    .iter()
                    .filter_map(|id| by_id.remove(id))
                    .collect();
                let mut extra: Vec<StepSummary> = by_id.into_values().collect();
                extra.sort_by(|a, b| a.step_id.cmp(&b.step_id));
                ordered.extend(extra);
                ordered
            }
            None => {
                let mut all: Vec<StepSummary> = by_id.into_values().collect();
                all.sort_by(|a, b| a.step_id.cmp(&b.step_id));
                all
            }
        };

        let duration_ms = match &completed_at {
            Some(end) => chrono::DateTime::parse_from_rfc3339(end)
                .ok()
                .zip(chrono::DateTime::parse_from_rfc3339(&created_at).ok())
                .map(|(end, start)| (end - start).num_milliseconds()),
            None => None,
        };

        Ok(RunSummary {
            run_id,
            final_state,
            created_at,
            completed_at,
            duration_ms,
            steps: step_summaries,
            completed_steps,
            failed_steps,
            skipped_steps,
            failed_hard_gates: gate_failures.into_iter().collect(),
            total_attempts,
            total_retries: retry_count,
        })
    }
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;
