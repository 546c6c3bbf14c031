//! Boot arbitration error types

use crate::platform::PlatformError;
use core::fmt;

/// Errors that end a boot attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootError {
    /// Image directory lists no bootable slots
    NoImages,
    /// Directory's current index does not name a listed slot
    CurrentOutOfRange,
    /// Requested boot target does not name a listed slot
    TargetOutOfRange,
    /// Platform access failed during arbitration
    Platform(PlatformError),
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootError::NoImages => write!(f, "no bootable images"),
            BootError::CurrentOutOfRange => write!(f, "current slot out of range"),
            BootError::TargetOutOfRange => write!(f, "boot target out of range"),
            BootError::Platform(e) => write!(f, "platform: {}", e),
        }
    }
}

impl From<PlatformError> for BootError {
    fn from(e: PlatformError) -> Self {
        BootError::Platform(e)
    }
}
