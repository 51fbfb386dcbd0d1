// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error classification driving retry eligibility.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a step failure. Only [`ErrorClass::TransientIo`] is
/// retry-eligible by default; everything else requires the step to opt in
/// via [`crate::step::StepDefinition::retry_classes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Transient infrastructure failure. Retry-eligible by default.
    TransientIo,
    /// A required input/contract was missing. Never retried.
    ContractInputMissing,
    /// A hard-gate step rejected the run. Never retried on the failing gate.
    HardGateFailed,
    /// A validation rule failed. Never retried.
    ValidationFailed,
    /// Unclassified failure. Never retried by default.
    Unknown,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::TransientIo => "transient_io",
            ErrorClass::ContractInputMissing => "contract_input_missing",
            ErrorClass::HardGateFailed => "hard_gate_failed",
            ErrorClass::ValidationFailed => "validation_failed",
            ErrorClass::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_snake_case() {
        let json = serde_json::to_string(&ErrorClass::HardGateFailed).unwrap_or_default();
        assert_eq!(json, "\"hard_gate_failed\"");
    }

    #[test]
    fn display_matches_wire_form() {
        assert_eq!(ErrorClass::TransientIo.to_string(), "transient_io");
    }
}
