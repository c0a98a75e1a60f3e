// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

//! Cooperative single-threaded timer driver.
//!
//! Nodes never spawn threads or own timers. A node that needs to be woken up
//! implements [`TimerSource`] and reports its next deadline; the [`DataLoop`]
//! fires it when the deadline has passed, on the caller's thread.

use std::{sync::Arc, time::Duration};

use tracing::trace;

use crate::clock::TimeSource;

/// The programmed state of a node's timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// The timer will not fire.
    Disarmed,
    /// Fire on the next loop turn.
    Immediate,
    /// Fire once the time source reaches this absolute time, in nanoseconds.
    At(u64),
}

/// Something the loop can wake up.
pub trait TimerSource {
    fn timeout(&self) -> Timeout;

    /// Called by the loop once the timeout expired. The source re-arms itself
    /// if it wants to fire again.
    fn on_timeout(&mut self);
}

/// Dispatches timer sources against a [`TimeSource`].
pub struct DataLoop {
    clock: Arc<dyn TimeSource>,
}

impl DataLoop {
    pub fn new(clock: Arc<dyn TimeSource>) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &Arc<dyn TimeSource> {
        &self.clock
    }

    /// Fires `source` if its timeout has expired, without waiting.
    ///
    /// # Returns
    ///
    /// `true` if the source was fired.
    pub fn dispatch(&self, source: &mut dyn TimerSource) -> bool {
        let due = match source.timeout() {
            Timeout::Disarmed => false,
            Timeout::Immediate => true,
            Timeout::At(deadline) => deadline <= self.clock.now(),
        };
        if due {
            trace!(now = self.clock.now(), "Timer expired");
            source.on_timeout();
        }
        due
    }

    /// Waits up to `max_wait` for the source's deadline, then dispatches.
    ///
    /// A disarmed source returns immediately.
    pub fn iterate(&self, source: &mut dyn TimerSource, max_wait: Duration) -> bool {
        if let Timeout::At(deadline) = source.timeout() {
            let now = self.clock.now();
            if deadline > now {
                let wait = Duration::from_nanos(deadline - now).min(max_wait);
                std::thread::sleep(wait);
            }
        }
        self.dispatch(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    struct Countdown {
        timeout: Timeout,
        fired: u32,
    }

    impl TimerSource for Countdown {
        fn timeout(&self) -> Timeout {
            self.timeout
        }

        fn on_timeout(&mut self) {
            self.fired += 1;
            self.timeout = Timeout::Disarmed;
        }
    }

    #[test]
    fn fires_only_when_due() {
        let clock = Arc::new(ManualClock::new(100));
        let data_loop = DataLoop::new(clock.clone());
        let mut source = Countdown {
            timeout: Timeout::At(150),
            fired: 0,
        };
        assert!(!data_loop.dispatch(&mut source));
        clock.advance(50);
        assert!(data_loop.dispatch(&mut source));
        assert!(!data_loop.dispatch(&mut source));
        assert_eq!(source.fired, 1);

        source.timeout = Timeout::Immediate;
        assert!(data_loop.iterate(&mut source, Duration::ZERO));
        assert_eq!(source.fired, 2);
    }
}
