//! Console interface trait
//!
//! This module defines the operator console interface: a byte-oriented serial
//! channel used for the boot banner, the override poll and the recovery
//! command session.

use crate::platform::{error::ConsoleError, Result};

/// Console interface trait
///
/// Platform implementations must provide this interface over whatever carries
/// the operator channel (UART, USB CDC, ...).
///
/// # Safety Invariants
///
/// - Only one owner per console instance
/// - `poll_byte` must never block; `read_byte` may block indefinitely
pub trait ConsoleInterface {
    /// Try to read one byte without blocking.
    ///
    /// Returns `Ok(None)` when no byte is pending.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Console` if the channel reports a failure.
    fn poll_byte(&mut self) -> Result<Option<u8>>;

    /// Read one byte, blocking until it arrives.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Console(ConsoleError::Closed)` once the channel
    /// can no longer produce bytes; other failures map to
    /// `ConsoleError::ReadFailed`.
    fn read_byte(&mut self) -> Result<u8>;

    /// Write bytes, returning how many were accepted.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Console` if the write fails.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Block until all pending transmit data has been sent.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Console` if the flush fails.
    fn flush(&mut self) -> Result<()>;

    /// Write all of `data`, retrying short writes.
    fn write_all(&mut self, mut data: &[u8]) -> Result<()> {
        while !data.is_empty() {
            let written = self.write(data)?;
            if written == 0 {
                return Err(ConsoleError::WriteFailed.into());
            }
            data = &data[written..];
        }
        Ok(())
    }

    /// Write `line` followed by a newline.
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.write_all(line.as_bytes())?;
        self.write_all(b"\n")
    }
}
