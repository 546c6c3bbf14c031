//! Image directory interface trait
//!
//! The image directory is the partition table kept by the second-stage image
//! loader: it knows which firmware slots exist in flash, which one is running,
//! and accepts a one-shot instruction naming the slot to load on the next
//! reset.

use crate::platform::Result;
use heapless::Vec;

/// Maximum number of firmware slots an image directory may report.
pub const MAX_IMAGE_SLOTS: usize = 4;

/// Raw image directory contents.
///
/// `offsets[i]` is the flash offset of slot `i`; `current` is the index of the
/// slot the running firmware was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDirectory {
    /// Index of the currently running slot
    pub current: u8,
    /// Flash offset per slot, in slot order
    pub offsets: Vec<u32, MAX_IMAGE_SLOTS>,
}

/// Image directory interface trait
///
/// # Safety Invariants
///
/// - Only one owner per directory instance
/// - `set_next_boot` must persist atomically: after it returns `Ok`, a reset
///   at any later point boots the named slot exactly once
pub trait ImageDirInterface {
    /// Read the directory contents.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::ImageDir(ImageDirError::ReadFailed)` if the
    /// directory metadata cannot be read.
    fn enumerate(&mut self) -> Result<ImageDirectory>;

    /// Persist a one-shot boot override naming `index` as the slot to load on
    /// the next reset.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::ImageDir(ImageDirError::WriteFailed)` if the
    /// override cannot be persisted.
    fn set_next_boot(&mut self, index: u8) -> Result<()>;
}
