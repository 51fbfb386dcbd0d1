// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `prun status <run_dir>` - read-only snapshot of a run's current state.

use anyhow::Result;
use clap::Args;
use prun_core::default_pipeline_steps;
use prun_engine::{PipelineDag, RunReconstructor};
use std::path::PathBuf;

use crate::output::OutputFormat;
use crate::table;

#[derive(Args)]
pub struct StatusArgs {
    /// Directory holding the run's event log
    pub run_dir: PathBuf,

    /// Emit machine-readable JSON instead of the human table
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: StatusArgs) -> Result<()> {
    let event_log = super::open_existing_log(&args.run_dir)?;
    let dag = PipelineDag::new(default_pipeline_steps());
    let ctx = RunReconstructor::new(&event_log).reconstruct(&dag)?;

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    match format {
        OutputFormat::Json => {
            let steps: Vec<_> = dag
                .order()
                .iter()
                .map(|step_id| {
                    serde_json::json!({
                        "step_id": step_id,
                        "state": ctx.step_states.get(step_id).map(|s| s.as_str()),
                        "attempts": ctx.step_attempts.get(step_id).copied().unwrap_or(0),
                    })
                })
                .collect();
            let value = serde_json::json!({
                "run_id": ctx.run_id,
                "run_state": ctx.run_state.as_str(),
                "steps": steps,
                "completed_steps": ctx.completed_steps.len(),
                "failed_hard_gates": ctx.failed_hard_gates.iter().collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            println!("Run: {}", ctx.run_id);
            println!("State: {}", ctx.run_state);
            println!();
            println!("Steps:");
            for step_id in dag.order() {
                let state = ctx
                    .step_states
                    .get(step_id)
                    .map(|s| s.as_str())
                    .unwrap_or("PENDING");
                let attempt = ctx.step_attempts.get(step_id).copied().unwrap_or(0);
                println!("{}", table::step_line(step_id, state, attempt));
            }
            println!();
            println!("Completed: {}", ctx.completed_steps.len());
            if !ctx.failed_hard_gates.is_empty() {
                let gates: Vec<&str> = ctx.failed_hard_gates.iter().map(String::as_str).collect();
                println!();
                println!("Failed hard gates: {}", gates.join(", "));
            }
        }
    }

    Ok(())
}
