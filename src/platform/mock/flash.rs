//! Mock flash implementation for testing
//!
//! Models NOR flash semantics: erase sets a sector to 0xFF, writes can only
//! clear bits (new = old AND data). Fault injection hooks cover corruption,
//! interrupted writes, and read failures.

use crate::platform::{error::FlashError, traits::FlashInterface, Result};
use core::cell::{Cell, RefCell};
use std::vec;
use std::vec::Vec;

/// Default mock flash capacity (4MB)
const DEFAULT_CAPACITY: u32 = 4 * 1024 * 1024;

/// Sector size (4KB)
const SECTOR_SIZE: u32 = 4096;

/// First writable address. Everything below this models the running
/// firmware image and rejects writes and erases.
const FIRMWARE_END: u32 = 0x40000;

/// Mock flash implementation backed by a `Vec`
pub struct MockFlash {
    storage: RefCell<Vec<u8>>,
    capacity: u32,
    /// Countdown to a simulated power loss: the write after this many
    /// successful writes only commits half its data
    power_loss_in: Cell<Option<u32>>,
    /// Countdown to a one-shot read failure
    read_fail_in: Cell<Option<u32>>,
    fail_next_write: Cell<bool>,
    fail_next_erase: Cell<bool>,
}

impl MockFlash {
    /// Create a new mock flash with the default 4MB capacity, fully erased
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new mock flash with the given capacity, fully erased
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            storage: RefCell::new(vec![0xFF; capacity as usize]),
            capacity,
            power_loss_in: Cell::new(None),
            read_fail_in: Cell::new(None),
            fail_next_write: Cell::new(false),
            fail_next_erase: Cell::new(false),
        }
    }

    /// Get a copy of flash contents for verification
    pub fn contents(&self, address: u32, len: usize) -> Vec<u8> {
        let storage = self.storage.borrow();
        let start = address as usize;
        storage[start..start + len].to_vec()
    }

    /// Overwrite a range with a 0xAA pattern, bypassing write semantics
    pub fn inject_corruption(&mut self, address: u32, len: usize) {
        let mut storage = self.storage.borrow_mut();
        let start = address as usize;
        for byte in &mut storage[start..start + len] {
            *byte = 0xAA;
        }
    }

    /// Make the next write commit only half its data, modeling power loss
    /// mid-write. The write itself reports success.
    pub fn simulate_power_loss(&mut self) {
        self.power_loss_in.set(Some(0));
    }

    /// Like [`simulate_power_loss`](Self::simulate_power_loss), but lets
    /// `writes` complete first
    pub fn simulate_power_loss_after(&mut self, writes: u32) {
        self.power_loss_in.set(Some(writes));
    }

    /// Fail the read after `reads` successful reads, once
    pub fn fail_read_after(&mut self, reads: u32) {
        self.read_fail_in.set(Some(reads));
    }

    /// Fail the next write with an error
    pub fn fail_next_write(&mut self) {
        self.fail_next_write.set(true);
    }

    /// Fail the next erase with an error
    pub fn fail_next_erase(&mut self) {
        self.fail_next_erase.set(true);
    }

    fn check_range(&self, address: u32, len: usize) -> Result<()> {
        let end = address as u64 + len as u64;
        if end > self.capacity as u64 {
            return Err(FlashError::InvalidAddress.into());
        }
        Ok(())
    }
}

impl Default for MockFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashInterface for MockFlash {
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        self.check_range(address, buf.len())?;

        if let Some(countdown) = self.read_fail_in.get() {
            if countdown == 0 {
                self.read_fail_in.set(None);
                return Err(FlashError::ReadFailed.into());
            }
            self.read_fail_in.set(Some(countdown - 1));
        }

        let storage = self.storage.borrow();
        let start = address as usize;
        buf.copy_from_slice(&storage[start..start + buf.len()]);
        Ok(())
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        self.check_range(address, data.len())?;
        if address < FIRMWARE_END {
            return Err(FlashError::InvalidAddress.into());
        }
        if self.fail_next_write.get() {
            self.fail_next_write.set(false);
            return Err(FlashError::WriteFailed.into());
        }

        let committed = match self.power_loss_in.get() {
            Some(0) => {
                self.power_loss_in.set(None);
                data.len() / 2
            }
            Some(countdown) => {
                self.power_loss_in.set(Some(countdown - 1));
                data.len()
            }
            None => data.len(),
        };

        let mut storage = self.storage.borrow_mut();
        let start = address as usize;
        for (offset, &byte) in data[..committed].iter().enumerate() {
            // NOR semantics: programming can only clear bits
            storage[start + offset] &= byte;
        }
        Ok(())
    }

    fn erase(&mut self, address: u32, size: u32) -> Result<()> {
        if address % SECTOR_SIZE != 0 || size % SECTOR_SIZE != 0 {
            return Err(FlashError::InvalidAddress.into());
        }
        self.check_range(address, size as usize)?;
        if address < FIRMWARE_END {
            return Err(FlashError::InvalidAddress.into());
        }
        if self.fail_next_erase.get() {
            self.fail_next_erase.set(false);
            return Err(FlashError::EraseFailed.into());
        }

        let mut storage = self.storage.borrow_mut();
        let start = address as usize;
        for byte in &mut storage[start..start + size as usize] {
            *byte = 0xFF;
        }
        Ok(())
    }

    fn sector_size(&self) -> u32 {
        SECTOR_SIZE
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erased_flash_reads_ff() {
        let mut flash = MockFlash::new();
        let mut buf = [0u8; 16];
        flash.read(0x100000, &mut buf).unwrap();
        assert_eq!(buf, [0xFF; 16]);
    }

    #[test]
    fn test_write_and_read_back() {
        let mut flash = MockFlash::new();
        flash.write(0x100000, &[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();

        let mut buf = [0u8; 4];
        flash.read(0x100000, &mut buf).unwrap();
        assert_eq!(buf, [0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_write_only_clears_bits() {
        let mut flash = MockFlash::new();
        flash.write(0x100000, &[0x0F]).unwrap();
        flash.write(0x100000, &[0xF0]).unwrap();

        let mut buf = [0u8; 1];
        flash.read(0x100000, &mut buf).unwrap();
        assert_eq!(buf[0], 0x00);
    }

    #[test]
    fn test_erase_restores_ff() {
        let mut flash = MockFlash::new();
        flash.write(0x100000, &[0x00; 64]).unwrap();
        flash.erase(0x100000, SECTOR_SIZE).unwrap();

        let mut buf = [0u8; 64];
        flash.read(0x100000, &mut buf).unwrap();
        assert_eq!(buf, [0xFF; 64]);
    }

    #[test]
    fn test_erase_rejects_unaligned() {
        let mut flash = MockFlash::new();
        assert!(flash.erase(0x100001, SECTOR_SIZE).is_err());
        assert!(flash.erase(0x100000, 100).is_err());
    }

    #[test]
    fn test_firmware_region_protected() {
        let mut flash = MockFlash::new();
        assert!(flash.write(0x1000, &[0x00]).is_err());
        assert!(flash.erase(0x1000, SECTOR_SIZE).is_err());

        // Reads are always allowed
        let mut buf = [0u8; 4];
        flash.read(0x1000, &mut buf).unwrap();
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut flash = MockFlash::with_capacity(1024 * 1024);
        let mut buf = [0u8; 8];
        assert!(flash.read(1024 * 1024 - 4, &mut buf).is_err());
    }

    #[test]
    fn test_power_loss_commits_half() {
        let mut flash = MockFlash::new();
        flash.simulate_power_loss();
        flash.write(0x100000, &[0x00; 8]).unwrap();

        let mut buf = [0u8; 8];
        flash.read(0x100000, &mut buf).unwrap();
        assert_eq!(&buf[..4], &[0x00; 4]);
        assert_eq!(&buf[4..], &[0xFF; 4]);

        // Subsequent writes are whole again
        flash.write(0x101000, &[0x00; 8]).unwrap();
        flash.read(0x101000, &mut buf).unwrap();
        assert_eq!(buf, [0x00; 8]);
    }

    #[test]
    fn test_read_failure_is_one_shot() {
        let mut flash = MockFlash::new();
        flash.fail_read_after(1);

        let mut buf = [0u8; 4];
        flash.read(0x100000, &mut buf).unwrap();
        assert!(flash.read(0x100000, &mut buf).is_err());
        flash.read(0x100000, &mut buf).unwrap();
    }
}
