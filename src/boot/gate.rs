//! Boot override gate
//!
//! A fixed listening window on the console during which an operator can
//! interrupt automatic boot by sending the trigger byte. The gate polls
//! rather than blocks, yielding between attempts, so a silent console
//! costs exactly the window and nothing more.

use crate::platform::traits::{ConsoleInterface, TimerInterface};

/// Byte that interrupts automatic boot
pub const OVERRIDE_TRIGGER: u8 = b':';

/// Length of the listening window in milliseconds
pub const OVERRIDE_WINDOW_MS: u32 = 500;

/// Yield between console polls
const GATE_POLL_INTERVAL_MS: u32 = 1;

/// Outcome of the listening window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateDecision {
    /// Trigger byte arrived inside the window
    Triggered,
    /// Window elapsed without the trigger byte
    TimedOut,
}

/// Time-boxed console watch for the boot override trigger
#[derive(Debug, Clone, Copy)]
pub struct OverrideGate {
    trigger: u8,
    window_ms: u32,
}

impl OverrideGate {
    /// Gate with the standard trigger and window
    pub const fn new() -> Self {
        Self {
            trigger: OVERRIDE_TRIGGER,
            window_ms: OVERRIDE_WINDOW_MS,
        }
    }

    /// Gate with a custom window length
    pub const fn with_window(window_ms: u32) -> Self {
        Self {
            trigger: OVERRIDE_TRIGGER,
            window_ms,
        }
    }

    /// Watch the console until the trigger arrives or the window elapses
    ///
    /// Non-trigger bytes are consumed and discarded. Console read errors
    /// count as no input; the gate never aborts a boot. The poll runs
    /// before the deadline check, so a byte landing exactly on the window
    /// edge still triggers.
    pub fn await_trigger<C, T>(&self, console: &mut C, timer: &mut T) -> GateDecision
    where
        C: ConsoleInterface,
        T: TimerInterface,
    {
        let start = timer.now_ms();
        loop {
            if let Ok(Some(byte)) = console.poll_byte() {
                if byte == self.trigger {
                    return GateDecision::Triggered;
                }
            }
            if timer.now_ms().saturating_sub(start) >= self.window_ms as u64 {
                return GateDecision::TimedOut;
            }
            let _ = timer.delay_ms(GATE_POLL_INTERVAL_MS);
        }
    }
}

impl Default for OverrideGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockConsole, MockTimer, SimClock};

    fn rig() -> (MockConsole, MockTimer) {
        let clock = SimClock::new();
        let console = MockConsole::new(clock.clone());
        let timer = MockTimer::with_clock(clock);
        (console, timer)
    }

    #[test]
    fn test_trigger_just_inside_window() {
        let (mut console, mut timer) = rig();
        console.push_byte_at(OVERRIDE_WINDOW_MS as u64 - 1, OVERRIDE_TRIGGER);

        let gate = OverrideGate::new();
        assert_eq!(
            gate.await_trigger(&mut console, &mut timer),
            GateDecision::Triggered
        );
    }

    #[test]
    fn test_trigger_just_outside_window() {
        let (mut console, mut timer) = rig();
        console.push_byte_at(OVERRIDE_WINDOW_MS as u64 + 1, OVERRIDE_TRIGGER);

        let gate = OverrideGate::new();
        assert_eq!(
            gate.await_trigger(&mut console, &mut timer),
            GateDecision::TimedOut
        );
    }

    #[test]
    fn test_trigger_on_window_edge() {
        let (mut console, mut timer) = rig();
        console.push_byte_at(OVERRIDE_WINDOW_MS as u64, OVERRIDE_TRIGGER);

        let gate = OverrideGate::new();
        assert_eq!(
            gate.await_trigger(&mut console, &mut timer),
            GateDecision::Triggered
        );
    }

    #[test]
    fn test_silent_console_times_out() {
        let (mut console, mut timer) = rig();

        let gate = OverrideGate::new();
        assert_eq!(
            gate.await_trigger(&mut console, &mut timer),
            GateDecision::TimedOut
        );
        assert_eq!(timer.now_ms(), OVERRIDE_WINDOW_MS as u64);
    }

    #[test]
    fn test_junk_bytes_ignored() {
        let (mut console, mut timer) = rig();
        console.push_byte_at(5, b'x');
        console.push_byte_at(6, b'\n');
        console.push_byte_at(20, OVERRIDE_TRIGGER);

        let gate = OverrideGate::new();
        assert_eq!(
            gate.await_trigger(&mut console, &mut timer),
            GateDecision::Triggered
        );
    }

    #[test]
    fn test_junk_alone_times_out() {
        let (mut console, mut timer) = rig();
        console.push_byte_at(5, b'x');

        let gate = OverrideGate::new();
        assert_eq!(
            gate.await_trigger(&mut console, &mut timer),
            GateDecision::TimedOut
        );
    }

    #[test]
    fn test_read_errors_count_as_silence() {
        let (mut console, mut timer) = rig();
        console.set_fail_reads(true);

        let gate = OverrideGate::new();
        assert_eq!(
            gate.await_trigger(&mut console, &mut timer),
            GateDecision::TimedOut
        );
    }

    #[test]
    fn test_custom_window() {
        let (mut console, mut timer) = rig();
        console.push_byte_at(40, OVERRIDE_TRIGGER);

        let gate = OverrideGate::with_window(30);
        assert_eq!(
            gate.await_trigger(&mut console, &mut timer),
            GateDecision::TimedOut
        );
    }
}
