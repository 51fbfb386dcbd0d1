//! Behavioral specifications for the `prun` CLI.
//!
//! These tests are black-box: they invoke the CLI binary and verify
//! stdout, stderr, exit codes, and the resulting event log.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/start_resume.rs"]
mod start_resume;
#[path = "specs/manual_gate.rs"]
mod manual_gate;
#[path = "specs/errors.rs"]
mod errors;
#[path = "specs/read_surfaces.rs"]
mod read_surfaces;
