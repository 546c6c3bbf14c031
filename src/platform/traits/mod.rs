//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod console;
pub mod flash;
pub mod image_dir;
pub mod net_info;
pub mod timer;

// Re-export trait interfaces
pub use console::ConsoleInterface;
pub use flash::FlashInterface;
pub use image_dir::{ImageDirInterface, ImageDirectory, MAX_IMAGE_SLOTS};
pub use net_info::NetInfoInterface;
pub use timer::TimerInterface;
