//! Parameter store error types

use crate::platform::PlatformError;
use core::fmt;

/// Errors reported by the parameter store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamError {
    /// Key not present in the store
    NotFound,
    /// Stored kind differs from the requested kind
    TypeMismatch,
    /// Store region is not valid (never formatted, interrupted write, or
    /// corrupted data)
    Corrupt,
    /// New entry does not fit in the data sector
    StoreFull,
    /// Key is empty or exceeds the key length limit
    InvalidKey,
    /// Flash access failed underneath the store
    Io(PlatformError),
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::NotFound => write!(f, "not found"),
            ParamError::TypeMismatch => write!(f, "type mismatch"),
            ParamError::Corrupt => write!(f, "store corrupt"),
            ParamError::StoreFull => write!(f, "store full"),
            ParamError::InvalidKey => write!(f, "invalid key"),
            ParamError::Io(e) => write!(f, "io: {}", e),
        }
    }
}

impl From<PlatformError> for ParamError {
    fn from(e: PlatformError) -> Self {
        ParamError::Io(e)
    }
}
