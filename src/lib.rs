#![cfg_attr(not(test), no_std)]

//! slotboot - First-stage boot arbiter for dual-image ESP8266 devices
//!
//! Decides which firmware image to hand off to, persists typed device
//! parameters in a dedicated flash region, and exposes a line-oriented
//! recovery console behind a short power-up override window.

// The mock platform is host-only and needs std linked in no_std builds
#[cfg(any(test, feature = "mock"))]
extern crate std;

// Platform abstraction layer
pub mod platform;

// Flash-backed typed parameter store
pub mod params;

// Boot arbitration: image directory, override gate, state machine
pub mod boot;

// Interactive command session
pub mod cli;

// Logging macros
pub mod logging;
