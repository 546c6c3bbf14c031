//! Network identity interface trait
//!
//! Read-only access to the device's network identity for the informational
//! console commands. The association stack itself lives outside this crate.

use crate::platform::Result;

/// Network identity interface trait
pub trait NetInfoInterface {
    /// Read the station MAC address.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::ResourceUnavailable` if the address cannot be
    /// read (e.g. the network stack is not up).
    fn mac_address(&mut self) -> Result<[u8; 6]>;

    /// Read the station IPv4 address.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::ResourceUnavailable` if no address has been
    /// assigned yet.
    fn ip_address(&mut self) -> Result<[u8; 4]>;
}
