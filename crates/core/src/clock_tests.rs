// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_starts_at_given_epoch() {
    let clock = FakeClock::new(1_000);
    assert_eq!(clock.epoch_ms(), 1_000);
}

#[test]
fn fake_clock_advances_on_sleep() {
    let clock = FakeClock::new(0);
    clock.sleep(Duration::from_millis(500));
    assert_eq!(clock.epoch_ms(), 500);
}

#[test]
fn fake_clock_advance_is_cumulative() {
    let clock = FakeClock::new(0);
    clock.advance(Duration::from_secs(2));
    clock.advance(Duration::from_secs(3));
    assert_eq!(clock.epoch_ms(), 5_000);
}

#[test]
fn fake_clock_now_utc_round_trips_epoch_ms() {
    let clock = FakeClock::new(123_456);
    assert_eq!(clock.now_utc().timestamp_millis(), 123_456);
}

#[test]
fn system_clock_epoch_ms_is_nonzero() {
    let clock = SystemClock;
    assert!(clock.epoch_ms() > 0);
}
