//! Timer interface trait
//!
//! This module defines the timer and delay interface that platform
//! implementations must provide.

use crate::platform::Result;

/// Timer interface trait
///
/// # Safety Invariants
///
/// - Timer peripheral must be initialized before use
/// - Monotonic time source (never goes backwards)
pub trait TimerInterface {
    /// Delay for at least `us` microseconds.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Timer` if the delay operation fails.
    fn delay_us(&mut self, us: u32) -> Result<()>;

    /// Delay for at least `ms` milliseconds.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Timer` if the delay operation fails.
    fn delay_ms(&mut self, ms: u32) -> Result<()> {
        self.delay_us(ms.saturating_mul(1000))
    }

    /// Get a monotonic timestamp in microseconds since platform init.
    fn now_us(&self) -> u64;

    /// Get a monotonic timestamp in milliseconds since platform init.
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }
}
