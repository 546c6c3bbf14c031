//! Interactive command session entered through the boot override gate
//!
//! - [`commands`] - the const registry driving lookup, arity checks and help
//! - [`session`] - the line-oriented dispatch loop and handlers

pub mod commands;
pub mod session;

pub use commands::{CommandId, CommandSpec, COMMANDS};
pub use session::{CommandSession, SessionEnd};
