//! Mock network identity implementation for testing

use crate::platform::{traits::NetInfoInterface, PlatformError, Result};
use core::cell::Cell;

/// Mock network identity source
pub struct MockNetInfo {
    mac: [u8; 6],
    ip: [u8; 4],
    available: Cell<bool>,
}

impl MockNetInfo {
    /// Create a mock with fixed default identity values
    pub fn new() -> Self {
        Self {
            mac: [0x5C, 0xCF, 0x7F, 0x01, 0x02, 0x03],
            ip: [192, 168, 1, 42],
            available: Cell::new(true),
        }
    }

    /// Create a mock with the given identity values
    pub fn with_identity(mac: [u8; 6], ip: [u8; 4]) -> Self {
        Self {
            mac,
            ip,
            available: Cell::new(true),
        }
    }

    /// Make identity queries fail, modeling an uninitialized interface
    pub fn set_unavailable(&mut self) {
        self.available.set(false);
    }
}

impl Default for MockNetInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl NetInfoInterface for MockNetInfo {
    fn mac_address(&mut self) -> Result<[u8; 6]> {
        if !self.available.get() {
            return Err(PlatformError::ResourceUnavailable);
        }
        Ok(self.mac)
    }

    fn ip_address(&mut self) -> Result<[u8; 4]> {
        if !self.available.get() {
            return Err(PlatformError::ResourceUnavailable);
        }
        Ok(self.ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_identity() {
        let mut net = MockNetInfo::new();
        assert_eq!(net.mac_address().unwrap(), [0x5C, 0xCF, 0x7F, 0x01, 0x02, 0x03]);
        assert_eq!(net.ip_address().unwrap(), [192, 168, 1, 42]);
    }

    #[test]
    fn test_unavailable() {
        let mut net = MockNetInfo::new();
        net.set_unavailable();
        assert!(matches!(
            net.mac_address(),
            Err(PlatformError::ResourceUnavailable)
        ));
        assert!(matches!(
            net.ip_address(),
            Err(PlatformError::ResourceUnavailable)
        ));
    }
}
