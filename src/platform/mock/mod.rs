//! Mock platform implementations for host-side testing
//!
//! Every platform trait has a scriptable mock with fault injection, so the
//! boot path can be exercised end to end without hardware. The mocks share
//! a [`SimClock`] where timing matters.

pub mod console;
pub mod flash;
pub mod image_dir;
pub mod net_info;
pub mod timer;

pub use console::MockConsole;
pub use flash::MockFlash;
pub use image_dir::MockImageDir;
pub use net_info::MockNetInfo;
pub use timer::{MockTimer, SimClock};
