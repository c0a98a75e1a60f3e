//! Frame Pacing
//!
//! Keeps the timing state of a running source and programs its one-shot timer.
//!
//! ## Modes
//! - **Live**: the timer fires at `start_time + elapsed_time`, the wall-clock
//!   target of the next frame. Targets are derived from the frame count, never
//!   from the previous wakeup, so late wakeups do not accumulate drift.
//! - **Async**: non-live, but driven by the timer; fires as soon as possible.
//! - **Demand**: non-live, non-async; the timer is never programmed and frames
//!   are produced from `process_output`.

// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

use medianode::{Fraction, NSEC_PER_SEC, Timeout};

/// Latest representable time; header timestamps are signed.
pub(crate) const MAX_TIME: u64 = i64::MAX as u64;

/// Media time of the first `frames` frames at `rate`, in nanoseconds.
///
/// Computed as `frames * denom * 1e9 / num` in 128-bit integer arithmetic,
/// saturating at [`MAX_TIME`].
pub(crate) fn frames_to_time(frames: u64, rate: Fraction) -> u64 {
    if rate.num == 0 {
        return 0;
    }
    let time = frames as u128 * rate.denom as u128 * NSEC_PER_SEC as u128 / rate.num as u128;
    u64::try_from(time).map_or(MAX_TIME, |time| time.min(MAX_TIME))
}

#[derive(Debug)]
pub(crate) struct Pacer {
    timeout: Timeout,
    live: bool,
    async_mode: bool,

    /// Epoch of the current run (clock time for live sources, 0 otherwise)
    pub start_time: u64,

    /// Media time of the frames produced since the epoch
    pub elapsed_time: u64,

    /// Frames produced since the last start
    pub frame_count: u64,

    /// Frame count at the epoch
    base_count: u64,
}

impl Pacer {
    pub fn new(live: bool, async_mode: bool) -> Self {
        Pacer {
            timeout: Timeout::Disarmed,
            live,
            async_mode,
            start_time: 0,
            elapsed_time: 0,
            frame_count: 0,
            base_count: 0,
        }
    }

    pub fn set_live(&mut self, live: bool) {
        self.live = live;
    }

    /// Whether this mode programs the timer at all.
    fn uses_timer(&self) -> bool {
        self.live || self.async_mode
    }

    pub fn set_timer(&mut self, enabled: bool) {
        if !self.uses_timer() {
            self.timeout = Timeout::Disarmed;
            return;
        }
        self.timeout = match (enabled, self.live) {
            (false, _) => Timeout::Disarmed,
            (true, true) => Timeout::At(self.pts()),
            (true, false) => Timeout::Immediate,
        };
    }

    /// Acknowledges an expiration; the timer is one-shot.
    pub fn consume(&mut self) {
        self.timeout = Timeout::Disarmed;
    }

    pub fn timeout(&self) -> Timeout {
        self.timeout
    }

    pub fn is_armed(&self) -> bool {
        self.timeout != Timeout::Disarmed
    }

    /// Starts a new run at `start_time`.
    pub fn reset(&mut self, start_time: u64) {
        self.start_time = start_time;
        self.elapsed_time = 0;
        self.frame_count = 0;
        self.base_count = 0;
    }

    /// Moves the epoch to `start_time` for the next frame, keeping the frame
    /// count.
    pub fn rebase(&mut self, start_time: u64) {
        self.start_time = start_time;
        self.elapsed_time = 0;
        self.base_count = self.frame_count;
    }

    /// Presentation time of the next frame.
    pub fn pts(&self) -> u64 {
        self.start_time.saturating_add(self.elapsed_time).min(MAX_TIME)
    }

    /// Accounts for one produced frame.
    pub fn advance(&mut self, rate: Fraction) {
        self.frame_count += 1;
        self.elapsed_time = frames_to_time(self.frame_count - self.base_count, rate);
    }
}
