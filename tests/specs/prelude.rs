//! Test helpers for `prun`'s behavioral specifications.
//!
//! Wraps `assert_cmd` with a small fluent builder so each spec file reads as
//! a sequence of CLI invocations against a disposable run directory.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use assert_cmd::assert::Assert;
use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A disposable directory a test can point `prun` at as its run directory.
pub struct RunDir {
    dir: TempDir,
}

impl RunDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp run dir"),
        }
    }

    /// Path to a not-yet-created run directory under the temp root, so
    /// `prun start` exercises its own directory-creation path.
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("run")
    }
}

impl Default for RunDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent builder around `Command::cargo_bin("prun")`.
pub struct PrunCmd {
    cmd: Command,
}

pub fn prun() -> PrunCmd {
    PrunCmd {
        cmd: Command::cargo_bin("prun").expect("locate prun binary"),
    }
}

impl PrunCmd {
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.cmd.arg(arg.as_ref());
        self
    }

    pub fn args<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, args: I) -> Self {
        for a in args {
            self.cmd.arg(a.as_ref());
        }
        self
    }

    pub fn path(self, path: impl AsRef<Path>) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    pub fn run(mut self) -> Assert {
        self.cmd.assert()
    }
}

/// `prun start <run_dir> [extra args...]`
pub fn start(run_dir: &Path, extra: &[&str]) -> Assert {
    prun().arg("start").path(run_dir).args(extra).run()
}

/// `prun resume <run_dir> [extra args...]`
pub fn resume(run_dir: &Path, extra: &[&str]) -> Assert {
    prun().arg("resume").path(run_dir).args(extra).run()
}

/// `prun status <run_dir> [extra args...]`
pub fn status(run_dir: &Path, extra: &[&str]) -> Assert {
    prun().arg("status").path(run_dir).args(extra).run()
}

/// `prun events <run_dir> [extra args...]`
pub fn events(run_dir: &Path, extra: &[&str]) -> Assert {
    prun().arg("events").path(run_dir).args(extra).run()
}

/// `prun summary <run_dir> [extra args...]`
pub fn summary(run_dir: &Path, extra: &[&str]) -> Assert {
    prun().arg("summary").path(run_dir).args(extra).run()
}

/// Reads and parses `<run_dir>/events.jsonl` directly, bypassing the CLI, for
/// assertions that need the raw event stream rather than a rendered view.
pub fn read_event_log(run_dir: &Path) -> Vec<serde_json::Value> {
    let content =
        std::fs::read_to_string(run_dir.join("events.jsonl")).expect("read events.jsonl");
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("parse event line"))
        .collect()
}
