// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `prun summary <run_dir>` - read-only final-state report for a run.

use anyhow::Result;
use clap::Args;
use prun_core::default_pipeline_steps;
use prun_engine::SummaryGenerator;
use std::path::PathBuf;

#[derive(Args)]
pub struct SummaryArgs {
    /// Directory holding the run's event log
    pub run_dir: PathBuf,

    /// Emit machine-readable JSON instead of the human report
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: SummaryArgs) -> Result<()> {
    let event_log = super::open_existing_log(&args.run_dir)?;
    let step_order: Vec<String> = default_pipeline_steps()
        .into_iter()
        .map(|s| s.step_id)
        .collect();
    let summary = SummaryGenerator::new(&event_log)
        .with_step_order(step_order)
        .generate()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary.to_json())?);
    } else {
        println!("{}", summary.to_text());
    }

    Ok(())
}
