// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time abstraction so the executor's timestamps and backoff sleeps are
//! deterministic under test.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Source of time for event timestamps, epoch math, and retry backoff.
pub trait Clock: Clone + Send + Sync {
    /// Current UTC time, used to stamp `timestamp_utc` on every event.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current time as milliseconds since the Unix epoch.
    fn epoch_ms(&self) -> u64 {
        self.now_utc().timestamp_millis().max(0) as u64
    }

    /// Block the calling thread for `d`. Overridden by [`FakeClock`] so retry
    /// backoff tests don't actually wait.
    fn sleep(&self, d: Duration) {
        std::thread::sleep(d);
    }
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic, manually-advanced clock for tests.
///
/// `sleep` is a no-op so retry-backoff code paths can be exercised without
/// slowing down the test suite; `advance` lets a test move time forward
/// explicitly when a test cares about elapsed duration.
#[derive(Debug, Clone)]
pub struct FakeClock {
    epoch_ms: Arc<AtomicU64>,
}

impl FakeClock {
    pub fn new(start_epoch_ms: u64) -> Self {
        Self {
            epoch_ms: Arc::new(AtomicU64::new(start_epoch_ms)),
        }
    }

    pub fn advance(&self, d: Duration) {
        self.epoch_ms
            .fetch_add(d.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for FakeClock {
    fn now_utc(&self) -> DateTime<Utc> {
        let ms = self.epoch_ms.load(Ordering::SeqCst);
        DateTime::from_timestamp_millis(ms as i64)
            .or_else(|| DateTime::from_timestamp(0, 0))
            .unwrap_or(chrono::DateTime::<Utc>::MIN_UTC)
    }

    fn epoch_ms(&self) -> u64 {
        self.epoch_ms.load(Ordering::SeqCst)
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
