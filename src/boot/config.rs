//! Boot configuration model
//!
//! Snapshot of the image directory plus the in-flight override decision.
//! The arbiter derives one of these per boot attempt; the temp override is
//! a one-shot instruction for the external image loader, persisted through
//! [`ImageDirInterface::set_next_boot`](crate::platform::traits::ImageDirInterface::set_next_boot)
//! and consumed on the following reset.

use crate::boot::error::BootError;
use crate::platform::traits::{ImageDirectory, MAX_IMAGE_SLOTS};
use heapless::Vec;

/// One bootable firmware image location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImageSlot {
    /// Slot index in the directory
    pub index: u8,
    /// Image base address in flash
    pub flash_offset: u32,
    /// Whether this slot holds the currently running image
    pub is_current: bool,
}

/// Boot configuration for one arbitration pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootConfig {
    current_rom: u8,
    slots: Vec<ImageSlot, MAX_IMAGE_SLOTS>,
    temp_override: Option<u8>,
}

impl BootConfig {
    /// Build a configuration from an enumerated image directory
    pub fn from_directory(dir: &ImageDirectory) -> Result<Self, BootError> {
        if dir.offsets.is_empty() {
            return Err(BootError::NoImages);
        }
        if dir.current as usize >= dir.offsets.len() {
            return Err(BootError::CurrentOutOfRange);
        }

        let mut slots = Vec::new();
        for (index, &flash_offset) in dir.offsets.iter().enumerate() {
            let slot = ImageSlot {
                index: index as u8,
                flash_offset,
                is_current: index as u8 == dir.current,
            };
            // Directory length is bounded by the same constant
            slots.push(slot).ok();
        }

        Ok(Self {
            current_rom: dir.current,
            slots,
            temp_override: None,
        })
    }

    /// Index of the currently running image
    pub fn current_rom(&self) -> u8 {
        self.current_rom
    }

    /// Number of bootable slots
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// All slots in directory order
    pub fn slots(&self) -> &[ImageSlot] {
        &self.slots
    }

    /// The alternate slot to boot next, `None` when only one slot exists
    pub fn next_slot(&self) -> Option<u8> {
        if self.slots.len() < 2 {
            return None;
        }
        Some((self.current_rom + 1) % self.slots.len() as u8)
    }

    /// One-shot boot target chosen this pass, if any
    pub fn temp_override(&self) -> Option<u8> {
        self.temp_override
    }

    /// Record the one-shot boot target
    pub fn set_temp_override(&mut self, index: u8) -> Result<(), BootError> {
        if index as usize >= self.slots.len() {
            return Err(BootError::TargetOutOfRange);
        }
        self.temp_override = Some(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory(current: u8, offsets: &[u32]) -> ImageDirectory {
        let mut dir = ImageDirectory {
            current,
            offsets: Vec::new(),
        };
        for &offset in offsets {
            dir.offsets.push(offset).unwrap();
        }
        dir
    }

    #[test]
    fn test_from_directory() {
        let config = BootConfig::from_directory(&directory(1, &[0x2000, 0x102000])).unwrap();
        assert_eq!(config.current_rom(), 1);
        assert_eq!(config.slot_count(), 2);
        assert_eq!(
            config.slots()[0],
            ImageSlot {
                index: 0,
                flash_offset: 0x2000,
                is_current: false
            }
        );
        assert!(config.slots()[1].is_current);
        assert_eq!(config.temp_override(), None);
    }

    #[test]
    fn test_empty_directory_rejected() {
        assert_eq!(
            BootConfig::from_directory(&directory(0, &[])),
            Err(BootError::NoImages)
        );
    }

    #[test]
    fn test_current_out_of_range_rejected() {
        assert_eq!(
            BootConfig::from_directory(&directory(2, &[0x2000, 0x102000])),
            Err(BootError::CurrentOutOfRange)
        );
    }

    #[test]
    fn test_next_slot_alternates() {
        let config = BootConfig::from_directory(&directory(0, &[0x2000, 0x102000])).unwrap();
        assert_eq!(config.next_slot(), Some(1));

        let config = BootConfig::from_directory(&directory(1, &[0x2000, 0x102000])).unwrap();
        assert_eq!(config.next_slot(), Some(0));
    }

    #[test]
    fn test_next_slot_none_for_single_image() {
        let config = BootConfig::from_directory(&directory(0, &[0x2000])).unwrap();
        assert_eq!(config.next_slot(), None);
    }

    #[test]
    fn test_set_temp_override_bounds() {
        let mut config = BootConfig::from_directory(&directory(0, &[0x2000, 0x102000])).unwrap();
        config.set_temp_override(1).unwrap();
        assert_eq!(config.temp_override(), Some(1));

        assert_eq!(
            config.set_temp_override(2),
            Err(BootError::TargetOutOfRange)
        );
    }
}
