//! Mock image directory implementation for testing

use crate::platform::{
    error::ImageDirError,
    traits::{ImageDirInterface, ImageDirectory},
    Result,
};
use core::cell::Cell;
use heapless::Vec;
use std::rc::Rc;

/// Mock image directory implementation
///
/// Holds a fixed directory and records the last persisted next-boot
/// selection. Clones share that record, so a test can keep a probe handle
/// while the directory is moved into the code under test.
#[derive(Clone)]
pub struct MockImageDir {
    directory: ImageDirectory,
    next_boot: Rc<Cell<Option<u8>>>,
    fail_enumerate: Rc<Cell<bool>>,
    fail_set_next: Rc<Cell<bool>>,
}

impl MockImageDir {
    /// Create a mock directory with the given current index and slot offsets
    pub fn new(current: u8, offsets: &[u32]) -> Self {
        let mut slots = Vec::new();
        for &offset in offsets {
            // Test construction; the slot limit is a fixed platform bound
            slots.push(offset).ok();
        }
        Self {
            directory: ImageDirectory {
                current,
                offsets: slots,
            },
            next_boot: Rc::new(Cell::new(None)),
            fail_enumerate: Rc::new(Cell::new(false)),
            fail_set_next: Rc::new(Cell::new(false)),
        }
    }

    /// Last slot index persisted via `set_next_boot`, if any
    pub fn next_boot(&self) -> Option<u8> {
        self.next_boot.get()
    }

    /// Make `enumerate` fail with an error
    pub fn fail_enumerate(&mut self) {
        self.fail_enumerate.set(true);
    }

    /// Make `set_next_boot` fail with an error
    pub fn fail_set_next(&mut self) {
        self.fail_set_next.set(true);
    }
}

impl ImageDirInterface for MockImageDir {
    fn enumerate(&mut self) -> Result<ImageDirectory> {
        if self.fail_enumerate.get() {
            return Err(ImageDirError::ReadFailed.into());
        }
        Ok(self.directory.clone())
    }

    fn set_next_boot(&mut self, index: u8) -> Result<()> {
        if self.fail_set_next.get() {
            return Err(ImageDirError::WriteFailed.into());
        }
        self.next_boot.set(Some(index));
        Ok(())
    }
}
