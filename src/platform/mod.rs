//! Platform abstraction layer
//!
//! This module provides hardware abstraction for the boundary collaborators
//! the boot core depends on: raw flash, the operator console, the image
//! directory, a monotonic timer and the network identity. All
//! platform-specific code must stay behind these traits.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{PlatformError, Result};
pub use traits::{
    ConsoleInterface, FlashInterface, ImageDirInterface, ImageDirectory, NetInfoInterface,
    TimerInterface,
};
