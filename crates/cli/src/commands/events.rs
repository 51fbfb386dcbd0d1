// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `prun events <run_dir>` - show or stream a run's event log.

use anyhow::Result;
use clap::Args;
use prun_core::Event;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Args)]
pub struct EventsArgs {
    /// Directory holding the run's event log
    pub run_dir: PathBuf,

    /// Show only the last N events
    #[arg(long)]
    pub tail: Option<usize>,

    /// Keep the process running and print new events as they're appended
    #[arg(long)]
    pub follow: bool,

    /// Emit each event as a JSON line instead of the human-readable form
    #[arg(long)]
    pub json: bool,
}

/// Fixed line shape: the first 19 characters of the RFC3339 timestamp
/// (seconds precision, no offset), the event type, the step id in brackets
/// when present, and `error=`/`reason=` suffixes when those fields are
/// present.
fn format_human(event: &Event) -> String {
    let mut line = format!(
        "{} {}",
        event.timestamp_utc.get(..19).unwrap_or(&event.timestamp_utc),
        event.event_type.as_str()
    );
    if let Some(step_id) = &event.step_id {
        line.push_str(&format!(" [{step_id}]"));
    }
    if let Some(error_class) = event.error_class {
        line.push_str(&format!(" error={error_class}"));
    }
    if let Some(reason) = &event.reason {
        line.push_str(&format!(" reason=\"{reason}\""));
    }
    line
}

fn print_event(event: &Event, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
    } else {
        println!("{}", format_human(event));
    }
    Ok(())
}

pub fn run(args: EventsArgs) -> Result<()> {
    let event_log = super::open_existing_log(&args.run_dir)?;

    let all_events = event_log.read_all()?;
    let to_print = match args.tail {
        Some(n) if all_events.len() > n => &all_events[all_events.len() - n..],
        _ => &all_events[..],
    };
    for event in to_print {
        print_event(event, args.json)?;
    }

    if args.follow {
        let cancel = Arc::new(AtomicBool::new(false));
        let stream = event_log.stream(cancel)?;
        for event in stream.skip(all_events.len()) {
            print_event(&event?, args.json)?;
        }
    }

    Ok(())
}
