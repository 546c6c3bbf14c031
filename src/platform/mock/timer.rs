//! Mock timer implementation for testing

use crate::platform::{traits::TimerInterface, Result};
use core::cell::Cell;
use std::rc::Rc;

/// Shared simulated clock.
///
/// Cloning yields a handle onto the same clock, so a `MockTimer` and a
/// `MockConsole` can agree on when scripted input arrives. Time only moves
/// when something advances it (a mock delay, or a test directly).
#[derive(Debug, Clone)]
pub struct SimClock(Rc<Cell<u64>>);

impl SimClock {
    /// Create a new clock starting at zero
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(0)))
    }

    /// Current simulated time in microseconds
    pub fn now_us(&self) -> u64 {
        self.0.get()
    }

    /// Current simulated time in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.0.get() / 1000
    }

    /// Advance the clock by `us` microseconds
    pub fn advance_us(&self, us: u64) {
        self.0.set(self.0.get().wrapping_add(us));
    }

    /// Advance the clock by `ms` milliseconds
    pub fn advance_ms(&self, ms: u64) {
        self.advance_us(ms.saturating_mul(1000));
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock timer implementation
///
/// Delays advance the shared simulated clock instead of sleeping, so timing
/// behavior is deterministic and instantaneous in tests.
#[derive(Debug)]
pub struct MockTimer {
    clock: SimClock,
}

impl MockTimer {
    /// Create a new mock timer with its own clock
    pub fn new() -> Self {
        Self {
            clock: SimClock::new(),
        }
    }

    /// Create a mock timer over an existing shared clock
    pub fn with_clock(clock: SimClock) -> Self {
        Self { clock }
    }

    /// Get a handle onto this timer's clock
    pub fn clock(&self) -> SimClock {
        self.clock.clone()
    }
}

impl Default for MockTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerInterface for MockTimer {
    fn delay_us(&mut self, us: u32) -> Result<()> {
        self.clock.advance_us(us as u64);
        Ok(())
    }

    fn now_us(&self) -> u64 {
        self.clock.now_us()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_timer_delay_advances_clock() {
        let mut timer = MockTimer::new();
        assert_eq!(timer.now_us(), 0);

        timer.delay_us(1000).unwrap();
        assert_eq!(timer.now_us(), 1000);

        timer.delay_ms(5).unwrap();
        assert_eq!(timer.now_ms(), 6);
    }

    #[test]
    fn test_shared_clock() {
        let mut timer = MockTimer::new();
        let clock = timer.clock();

        timer.delay_ms(10).unwrap();
        assert_eq!(clock.now_ms(), 10);

        clock.advance_ms(5);
        assert_eq!(timer.now_ms(), 15);
    }
}
