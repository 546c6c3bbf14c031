//! Typed parameter store over a dedicated flash region
//!
//! - [`store`] - region layout, format, get/set/iterate
//! - [`value`] - value kinds and textual forms
//! - [`keys`] - the canonical key schema and build-time credential seeding

pub mod error;
pub mod keys;
pub mod store;
pub mod value;

pub use error::ParamError;
pub use store::{ParamStore, Parameter, Region};
pub use value::{ParamKind, ParamValue};
