//! Flash interface trait
//!
//! This module defines the raw flash interface that platform implementations
//! must provide. The parameter store is the only flash consumer in this crate.

use crate::platform::Result;

/// Flash interface trait
///
/// Platform implementations must provide this interface for flash
/// read/write/erase operations.
///
/// # Flash Characteristics
///
/// - Flash is organized in sectors (typically 4 KB)
/// - Erase operations set all bytes to 0xFF
/// - Write operations can only change bits from 1→0 (must erase first)
/// - Erase/write are blocking and can take 100ms+
///
/// # Safety Invariants
///
/// - Flash peripheral must be initialized before use
/// - Only one owner per flash instance (no concurrent access)
/// - Implementations must refuse writes into the firmware region
pub trait FlashInterface {
    /// Read `buf.len()` bytes starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if the range
    /// is out of bounds, `FlashError::ReadFailed` if the read itself fails.
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()>;

    /// Write `data` starting at `address`.
    ///
    /// The target range must have been erased first; writes can only clear
    /// bits.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if the range
    /// is out of bounds or protected, `FlashError::WriteFailed` if the write
    /// itself fails.
    fn write(&mut self, address: u32, data: &[u8]) -> Result<()>;

    /// Erase `size` bytes starting at `address`, setting them to 0xFF.
    ///
    /// `address` must be sector-aligned and `size` a multiple of the sector
    /// size.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` for
    /// misaligned or out-of-bounds ranges, `FlashError::EraseFailed` if the
    /// erase itself fails.
    fn erase(&mut self, address: u32, size: u32) -> Result<()>;

    /// Get the minimum erasable unit size in bytes.
    fn sector_size(&self) -> u32;

    /// Get the total flash capacity in bytes.
    fn capacity(&self) -> u32;
}
