// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `prun start <run_dir>` - begin a new run of the default pipeline.

use anyhow::{bail, Result};
use clap::Args;
use prun_core::{default_pipeline_steps, RunState, SystemClock, UuidIdGen};
use prun_engine::PipelineExecutor;
use prun_storage::EventLog;
use std::path::PathBuf;

use crate::demo_steps;

#[derive(Args)]
pub struct StartArgs {
    /// Directory to hold this run's event log (created if absent)
    pub run_dir: PathBuf,

    /// Run id to stamp on every event (defaults to the run directory's name)
    #[arg(long = "run-id")]
    pub run_id: Option<String>,

    /// Free-text reason recorded on `run.created`/`run.completed`
    #[arg(long)]
    pub reason: Option<String>,
}

pub fn run(args: StartArgs) -> Result<()> {
    if args.run_dir.join("events.jsonl").exists() {
        bail!(
            "a run already exists at {}: use `prun resume` instead",
            args.run_dir.display()
        );
    }

    let run_id = match args.run_id {
        Some(id) => id,
        None => super::default_run_id(&args.run_dir)?,
    };

    let event_log = EventLog::open(&args.run_dir)?;
    let executor = PipelineExecutor::new(
        event_log,
        demo_steps::default_step_functions(),
        default_pipeline_steps(),
        UuidIdGen,
        SystemClock,
    );

    let mut ctx = executor.start(&run_id, args.reason)?;
    let final_state = executor.execute(&mut ctx)?;

    println!("run {run_id}: {final_state}");

    match final_state {
        RunState::Succeeded | RunState::Blocked => Ok(()),
        other => bail!("run {run_id} ended in {other}"),
    }
}
