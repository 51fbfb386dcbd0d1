// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `prun resume <run_dir>` - continue an interrupted or blocked run.

use anyhow::{bail, Result};
use clap::Args;
use prun_core::{default_pipeline_steps, RunState, SystemClock, UuidIdGen};
use prun_engine::{PipelineDag, PipelineExecutor, ResumeGuard, RunReconstructor};
use std::path::PathBuf;

use crate::demo_steps;

#[derive(Args)]
pub struct ResumeArgs {
    /// Directory holding the run's event log
    pub run_dir: PathBuf,

    /// Approve the resume point if it is a manual-gated step that would
    /// otherwise re-block the run
    #[arg(long = "approve-manual-gate")]
    pub approve_manual_gate: bool,

    /// Resume from a specific step id instead of the auto-detected resume
    /// point (must be at or after that point)
    #[arg(long = "from-step")]
    pub from_step: Option<String>,
}

pub fn run(args: ResumeArgs) -> Result<()> {
    let event_log = super::open_existing_log(&args.run_dir)?;
    let dag = PipelineDag::new(default_pipeline_steps());

    let mut ctx = RunReconstructor::new(&event_log).reconstruct(&dag)?;
    ResumeGuard::validate_resume(&ctx)?;

    if let Some(from_step) = &args.from_step {
        let auto_point = ResumeGuard::get_resume_point(&ctx, &dag);
        if let Some(auto_point) = &auto_point {
            let order = dag.order();
            let auto_idx = order.iter().position(|s| s == auto_point);
            let requested_idx = order.iter().position(|s| s == from_step);
            match (auto_idx, requested_idx) {
                (Some(a), Some(r)) if r < a => {
                    bail!(
                        "cannot resume from {from_step}: earlier than the auto-detected resume point {auto_point}"
                    );
                }
                (_, None) => bail!("unknown step: {from_step}"),
                _ => {}
            }
        }
    }

    let executor = PipelineExecutor::new(
        event_log,
        demo_steps::default_step_functions(),
        default_pipeline_steps(),
        UuidIdGen,
        SystemClock,
    );

    let final_state =
        executor.resume(&mut ctx, args.from_step.as_deref(), args.approve_manual_gate)?;

    println!("run {}: {final_state}", ctx.run_id);

    match final_state {
        RunState::Succeeded | RunState::Blocked => Ok(()),
        other => bail!("run {} ended in {other}", ctx.run_id),
    }
}
