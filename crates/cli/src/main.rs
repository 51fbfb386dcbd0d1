// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! prun - fail-closed pipeline runner CLI.

mod commands;
mod demo_steps;
mod output;
mod table;

use clap::{Parser, Subcommand};
use commands::{events, resume, start, status, summary};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "prun",
    version,
    about = "Fail-closed pipeline runner: start, resume, and inspect runs from their event log"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new run
    Start(start::StartArgs),
    /// Resume an interrupted or blocked run
    Resume(resume::ResumeArgs),
    /// Show the current state of a run
    Status(status::StatusArgs),
    /// Show or stream a run's event log
    Events(events::EventsArgs),
    /// Show a run's final summary
    Summary(summary::SummaryArgs),
}

fn main() -> ExitCode {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Start(args) => start::run(args),
        Commands::Resume(args) => resume::run(args),
        Commands::Status(args) => status::run(args),
        Commands::Events(args) => events::run(args),
        Commands::Summary(args) => summary::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
