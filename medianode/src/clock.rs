// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

//! Time sources and the clock interface.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};

use serde::Serialize;

use crate::{Error, Result, pod::Object, types::TypeId};

/// Nanoseconds per second.
pub const NSEC_PER_SEC: u64 = 1_000_000_000;

/// A monotonic nanosecond time source.
pub trait TimeSource: Send + Sync {
    /// Current time in nanoseconds.
    fn now(&self) -> u64;
}

/// [`TimeSource`] backed by [`Instant`], counting from its creation.
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Manually advanced [`TimeSource`], for deterministic scheduling.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, delta: u64) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// A clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClockTime {
    /// Ticks per second.
    pub rate: i32,
    /// Ticks since the clock started.
    pub ticks: i64,
    /// System monotonic time matching `ticks`, in nanoseconds.
    pub monotonic_time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClockState {
    Stopped,
    Paused,
    Running,
}

/// The clock interface a node may expose.
pub trait Clock {
    fn state(&self) -> ClockState {
        ClockState::Stopped
    }

    fn enum_params(&self, _id: TypeId, _index: &mut u32) -> Result<Option<Object>> {
        Err(Error::NotImplemented)
    }

    fn set_param(&mut self, _id: TypeId, _flags: u32, _param: Option<&Object>) -> Result<()> {
        Err(Error::NotImplemented)
    }

    fn get_time(&self) -> Result<ClockTime>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::new(5);
        assert_eq!(clock.now(), 5);
        clock.advance(NSEC_PER_SEC);
        assert_eq!(clock.now(), NSEC_PER_SEC + 5);
        clock.set(1);
        assert_eq!(clock.now(), 1);
    }
}
