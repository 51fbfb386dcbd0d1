// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations.

pub mod events;
pub mod resume;
pub mod start;
pub mod status;
pub mod summary;

use anyhow::{bail, Result};
use prun_storage::EventLog;
use std::path::Path;

/// Open a run's event log for a read-only command (`status`, `events`,
/// `summary`). Unlike [`EventLog::open`], this refuses to silently create a
/// fresh, empty log for a run directory that was never started.
pub fn open_existing_log(run_dir: &Path) -> Result<EventLog> {
    if !run_dir.join("events.jsonl").exists() {
        bail!(
            "no run found at {}: events.jsonl does not exist",
            run_dir.display()
        );
    }
    Ok(EventLog::open(run_dir)?)
}

/// The run id a command should use when the caller didn't pass `--run-id`:
/// the run directory's own file name.
pub fn default_run_id(run_dir: &Path) -> Result<String> {
    run_dir
        .file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("cannot derive a run id from path {}", run_dir.display()))
}
