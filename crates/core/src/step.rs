// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step declarations and the default pipeline DAG.

use crate::error_class::ErrorClass;
use serde::{Deserialize, Serialize};

/// Declares one step in the pipeline DAG. Order in the owning `Vec` is the
/// dependency order: step *i* depends on every step before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub step_id: String,
    pub name: String,
    #[serde(default)]
    pub is_hard_gate: bool,
    #[serde(default)]
    pub is_manual_gated: bool,
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default = "default_retry_classes")]
    pub retry_classes: Vec<ErrorClass>,
}

fn default_retry_classes() -> Vec<ErrorClass> {
    vec![ErrorClass::TransientIo]
}

impl StepDefinition {
    pub fn new(step_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            name: name.into(),
            is_hard_gate: false,
            is_manual_gated: false,
            max_retries: 0,
            retry_classes: default_retry_classes(),
        }
    }

    pub fn hard_gate(mut self) -> Self {
        self.is_hard_gate = true;
        self
    }

    pub fn manual_gated(mut self) -> Self {
        self.is_manual_gated = true;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Step-local retry eligibility: attempt budget plus error-class opt-in.
    /// Does not account for the hard-gate override applied by the engine's
    /// `RetryPolicy` (`prun_engine::state_machine::RetryPolicy`).
    pub fn allows_retry(&self, error_class: ErrorClass, current_attempt: u32) -> bool {
        if current_attempt >= self.max_retries {
            return false;
        }
        self.retry_classes.contains(&error_class)
    }
}

/// The default eight-step DAG shipped as the runner's demo/reference
/// pipeline: a contract preflight gate, a benchmark gate, two unguarded
/// build stages, a quality gate, a second build stage, an artifact-verify
/// gate, and a manually-gated publish step.
pub fn default_pipeline_steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new("preflight_contract_check", "Preflight contract check").hard_gate(),
        StepDefinition::new("phase_benchmark", "Phase benchmark")
            .hard_gate()
            .with_max_retries(2),
        StepDefinition::new("stage_data_layout", "Stage data layout").with_max_retries(3),
        StepDefinition::new("build_steward_bundle", "Build steward bundle").with_max_retries(2),
        StepDefinition::new("validate_bundle_quality", "Validate bundle quality").hard_gate(),
        StepDefinition::new("build_minimal_deliverable", "Build minimal deliverable")
            .with_max_retries(2),
        StepDefinition::new("verify_artifacts", "Verify artifacts").hard_gate(),
        StepDefinition::new("publish_internal", "Publish internal").manual_gated(),
    ]
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
