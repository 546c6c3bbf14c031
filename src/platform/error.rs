//! Platform error types
//!
//! This module defines error types for platform operations.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All platform implementations map their HAL-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlatformError {
    /// Flash operation failed
    Flash(FlashError),
    /// Console operation failed
    Console(ConsoleError),
    /// Image directory operation failed
    ImageDir(ImageDirError),
    /// Timer operation failed
    Timer(TimerError),
    /// Resource not available
    ResourceUnavailable,
}

/// Flash-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Read operation failed
    ReadFailed,
    /// Write operation failed
    WriteFailed,
    /// Erase operation failed
    EraseFailed,
    /// Invalid address (out of bounds or misaligned)
    InvalidAddress,
}

/// Console-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleError {
    /// Read operation failed
    ReadFailed,
    /// Write operation failed
    WriteFailed,
    /// Input channel is gone and will not produce further bytes
    Closed,
}

/// Image-directory-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageDirError {
    /// Directory metadata could not be read
    ReadFailed,
    /// Boot override could not be persisted
    WriteFailed,
}

/// Timer-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// Timer overflow
    Overflow,
    /// Invalid duration
    InvalidDuration,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Flash(e) => write!(f, "flash error: {:?}", e),
            PlatformError::Console(e) => write!(f, "console error: {:?}", e),
            PlatformError::ImageDir(e) => write!(f, "image directory error: {:?}", e),
            PlatformError::Timer(e) => write!(f, "timer error: {:?}", e),
            PlatformError::ResourceUnavailable => write!(f, "resource not available"),
        }
    }
}

impl From<FlashError> for PlatformError {
    fn from(error: FlashError) -> Self {
        PlatformError::Flash(error)
    }
}

impl From<ConsoleError> for PlatformError {
    fn from(error: ConsoleError) -> Self {
        PlatformError::Console(error)
    }
}

impl From<ImageDirError> for PlatformError {
    fn from(error: ImageDirError) -> Self {
        PlatformError::ImageDir(error)
    }
}

impl From<TimerError> for PlatformError {
    fn from(error: TimerError) -> Self {
        PlatformError::Timer(error)
    }
}
