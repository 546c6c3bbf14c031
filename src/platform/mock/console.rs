//! Mock console implementation for testing
//!
//! Input is a script of bytes with arrival times on a shared [`SimClock`].
//! A byte becomes visible to `poll_byte` once the clock reaches its arrival
//! time; `read_byte` advances the clock to the next arrival, modeling a
//! blocking read. An exhausted script reads as a closed console.
//!
//! Clones share the script and the transmit capture, so a test can keep a
//! probe handle while the console itself is moved into the code under
//! test.

use crate::platform::{error::ConsoleError, mock::SimClock, traits::ConsoleInterface, Result};
use core::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

/// Mock console implementation
#[derive(Clone)]
pub struct MockConsole {
    clock: SimClock,
    script: Rc<RefCell<VecDeque<(u64, u8)>>>,
    tx: Rc<RefCell<Vec<u8>>>,
    fail_reads: Rc<Cell<bool>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MockConsole {
    /// Create a new mock console over a shared clock, with no scripted input
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            script: Rc::new(RefCell::new(VecDeque::new())),
            tx: Rc::new(RefCell::new(Vec::new())),
            fail_reads: Rc::new(Cell::new(false)),
            fail_writes: Rc::new(Cell::new(false)),
        }
    }

    /// Script a single byte arriving at `arrival_ms`
    pub fn push_byte_at(&mut self, arrival_ms: u64, byte: u8) {
        self.script.borrow_mut().push_back((arrival_ms, byte));
    }

    /// Script a run of bytes all arriving at `arrival_ms`
    pub fn push_bytes_at(&mut self, arrival_ms: u64, bytes: &[u8]) {
        let mut script = self.script.borrow_mut();
        for &byte in bytes {
            script.push_back((arrival_ms, byte));
        }
    }

    /// Script a line of input (newline appended) arriving at `arrival_ms`
    pub fn push_line_at(&mut self, arrival_ms: u64, line: &str) {
        self.push_bytes_at(arrival_ms, line.as_bytes());
        self.push_byte_at(arrival_ms, b'\n');
    }

    /// Script a line of input arriving immediately
    pub fn push_line(&mut self, line: &str) {
        self.push_line_at(self.clock.now_ms(), line);
    }

    /// Get a copy of everything written to the console
    pub fn tx_buffer(&self) -> Vec<u8> {
        self.tx.borrow().clone()
    }

    /// Get everything written to the console as a string
    pub fn tx_string(&self) -> std::string::String {
        std::string::String::from_utf8(self.tx_buffer()).unwrap_or_default()
    }

    /// Clear the transmit capture
    pub fn clear_tx_buffer(&mut self) {
        self.tx.borrow_mut().clear();
    }

    /// Make reads fail with an error until cleared
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads.set(fail);
    }

    /// Make writes fail with an error until cleared
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl ConsoleInterface for MockConsole {
    fn poll_byte(&mut self) -> Result<Option<u8>> {
        if self.fail_reads.get() {
            return Err(ConsoleError::ReadFailed.into());
        }

        let mut script = self.script.borrow_mut();
        match script.front() {
            Some(&(arrival_ms, byte)) if arrival_ms <= self.clock.now_ms() => {
                script.pop_front();
                Ok(Some(byte))
            }
            _ => Ok(None),
        }
    }

    fn read_byte(&mut self) -> Result<u8> {
        if self.fail_reads.get() {
            return Err(ConsoleError::ReadFailed.into());
        }

        let mut script = self.script.borrow_mut();
        match script.pop_front() {
            Some((arrival_ms, byte)) => {
                let now = self.clock.now_ms();
                if arrival_ms > now {
                    self.clock.advance_ms(arrival_ms - now);
                }
                Ok(byte)
            }
            None => Err(ConsoleError::Closed.into()),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        if self.fail_writes.get() {
            return Err(ConsoleError::WriteFailed.into());
        }
        self.tx.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<()> {
        if self.fail_writes.get() {
            return Err(ConsoleError::WriteFailed.into());
        }
        Ok(())
    }
}
