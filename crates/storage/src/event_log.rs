// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL event log: the system of record for a run.
//!
//! Unlike the group-commit write-ahead log this is adapted from, every
//! `append` is a single write-plus-flush syscall pair and is immediately
//! visible to a concurrent reader (`tail`, `events --follow`). There is no
//! write buffer and no batching: the runner is single-threaded and
//! correctness depends on each event being durable before the next step
//! starts, not on write throughput.

use prun_core::Event;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

const FILE_NAME: &str = "events.jsonl";

#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt event log at line {line}: {message}")]
    Corrupt { line: u64, message: String },
}

/// Handle to a run's `events.jsonl`. Every method re-opens the file for its
/// own operation rather than holding a long-lived handle, keeping the type
/// trivially `Send` and safe to construct fresh per CLI invocation.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    /// Open (creating if absent) the event log rooted at `run_dir`.
    ///
    /// The log file is created with `0600` permissions on unix: the run
    /// directory may contain step outputs and secrets passed through
    /// `inputs_hash`/`outputs_hash`-adjacent artifacts, so the log itself
    /// should not be world-readable.
    pub fn open(run_dir: &Path) -> Result<Self, EventLogError> {
        std::fs::create_dir_all(run_dir)?;
        let path = run_dir.join(FILE_NAME);
        if !path.exists() {
            Self::create_with_restrictive_permissions(&path)?;
        }
        Ok(Self { path })
    }

    #[cfg(unix)]
    fn create_with_restrictive_permissions(path: &Path) -> Result<(), EventLogError> {
        OpenOptions::new()
            .create(true)
            .write(true)
            .mode(0o600)
            .open(path)?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn create_with_restrictive_permissions(path: &Path) -> Result<(), EventLogError> {
        File::create(path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event as a single compact JSON line, flushed before
    /// returning. The caller must treat a successful return as durable.
    pub fn append(&self, event: &Event) -> Result<(), EventLogError> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(&line)?;
        file.flush()?;
        file.sync_data()?;
        Ok(())
    }

    /// Read every event in the log, in append order.
    ///
    /// Fails closed: a malformed line is reported as [`EventLogError::Corrupt`]
    /// rather than silently skipped, since reconstruction must not proceed
    /// on a log it cannot fully trust.
    pub fn read_all(&self) -> Result<Vec<Event>, EventLogError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut events = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let event: Event =
                serde_json::from_str(trimmed).map_err(|e| EventLogError::Corrupt {
                    line: idx as u64 + 1,
                    message: e.to_string(),
                })?;
            events.push(event);
        }

        Ok(events)
    }

    /// The last `n` events, in append order.
    pub fn tail(&self, n: usize) -> Result<Vec<Event>, EventLogError> {
        let mut events = self.read_all()?;
        if events.len() > n {
            events.drain(0..events.len() - n);
        }
        Ok(events)
    }

    /// Live event stream: an iterator that yields every existing event and
    /// then blocks, polling for newly appended lines, until `cancel` is set.
    ///
    /// There is no inotify/kqueue dependency here — the runner is
    /// single-writer and single-reader-at-a-time by design (see §5 of the
    /// resource model), so a short poll loop is the simplest thing that is
    /// still correct: a concurrent `append` is always a whole line (flushed
    /// and `fsync`'d before returning), so the reader never observes a
    /// partial line, only "no new line yet".
    pub fn stream(&self, cancel: Arc<AtomicBool>) -> Result<EventStream, EventLogError> {
        let file = OpenOptions::new().read(true).open(&self.path)?;
        Ok(EventStream {
            reader: BufReader::new(file),
            cancel,
            poll_interval: Duration::from_millis(100),
            line_no: 0,
        })
    }
}

/// Iterator returned by [`EventLog::stream`]. Each call to `next` either
/// returns the next event, a corruption error (which ends the stream), or
/// blocks in a poll loop until more data is appended or `cancel` is set.
pub struct EventStream {
    reader: BufReader<File>,
    cancel: Arc<AtomicBool>,
    poll_interval: Duration,
    line_no: u64,
}

impl EventStream {
    /// Override the default 100ms poll interval (tests use a tighter one).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Iterator for EventStream {
    type Item = Result<Event, EventLogError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();
        loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    if self.cancel.load(Ordering::SeqCst) {
                        return None;
                    }
                    std::thread::sleep(self.poll_interval);
                    continue;
                }
                Ok(_) => {
                    self.line_no += 1;
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return Some(serde_json::from_str(trimmed).map_err(|e| {
                        EventLogError::Corrupt {
                            line: self.line_no,
                            message: e.to_string(),
                        }
                    }));
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

#[cfg(test)]
#[path = "event_log_tests.rs"]
mod tests;
