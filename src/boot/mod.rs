//! Boot decision layer
//!
//! Everything between power-up and the jump decision: the image
//! directory snapshot, the override gate on the console, the arbitration
//! state machine, and the readiness signal external services wait on.

pub mod arbiter;
pub mod config;
pub mod error;
pub mod gate;
pub mod ready;

pub use arbiter::{BootArbiter, Terminal};
pub use config::{BootConfig, ImageSlot};
pub use error::BootError;
pub use gate::{GateDecision, OverrideGate, OVERRIDE_TRIGGER, OVERRIDE_WINDOW_MS};
pub use ready::ReadySignal;
