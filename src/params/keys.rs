//! Canonical persisted key schema
//!
//! One registry of every key the firmware family stores, with its value
//! kind and ownership. The command session derives write kinds from this
//! table; keys outside it are accepted as plain text.
//!
//! Two incompatible key schemas circulated for the security material and
//! the access-point flag. This table is the canonical pick: the `secur.*`
//! names, and `wifi.ap.enable` reading true when the node starts as an
//! access point.

use crate::params::error::ParamError;
use crate::params::store::ParamStore;
use crate::params::value::{ParamKind, ParamValue};
use crate::platform::traits::FlashInterface;
use bitflags::bitflags;

/// Station network name, seeded from build-time credentials when absent
pub const STATION_SSID: &str = "wifi.ssid.name";

/// Station network passphrase
pub const STATION_PASS: &str = "wifi.ssid.pass";

bitflags! {
    /// Key attribute flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KeyFlags: u8 {
        /// Owned by provisioning tooling, not meant for operator edits
        const SYSTEM = 0b0000_0001;
    }
}

/// One schema entry: key name, value kind, attributes
#[derive(Debug, Clone, Copy)]
pub struct KeyDef {
    /// Key name
    pub name: &'static str,
    /// Value kind
    pub kind: ParamKind,
    /// Attribute flags
    pub flags: KeyFlags,
}

const fn user(name: &'static str, kind: ParamKind) -> KeyDef {
    KeyDef {
        name,
        kind,
        flags: KeyFlags::empty(),
    }
}

const fn system(name: &'static str, kind: ParamKind) -> KeyDef {
    KeyDef {
        name,
        kind,
        flags: KeyFlags::SYSTEM,
    }
}

/// The canonical key table
pub const KEYS: &[KeyDef] = &[
    // Operator-facing configuration
    user(STATION_SSID, ParamKind::Text),
    user(STATION_PASS, ParamKind::Text),
    user("node.name", ParamKind::Text),
    user("mqtt.server.enable", ParamKind::Bool),
    user("mqtt.server.ip", ParamKind::Text),
    user("mqtt.server.port", ParamKind::UInt32),
    // Node identity and partitioning
    system("node.id", ParamKind::UInt32),
    system("node.type", ParamKind::Text),
    system("node.prefix", ParamKind::Text),
    system("spiffs.enable", ParamKind::Bool),
    system("spiffs.start", ParamKind::UInt32),
    system("spiffs.size", ParamKind::UInt32),
    // Cryptographic material
    system("secur.aeskey", ParamKind::Binary),
    system("secur.pubkey", ParamKind::Text),
    system("secur.privkey", ParamKind::Text),
    // Recovery and maintenance services
    system("tftp.server.enable", ParamKind::Bool),
    system("coredump.server.enable", ParamKind::Bool),
    system("coredump.server.ip", ParamKind::Text),
    system("coredump.server.port", ParamKind::UInt32),
    system("fota.server.enable", ParamKind::Bool),
    system("fota.server.ip", ParamKind::Text),
    system("fota.server.port", ParamKind::UInt32),
    // Access-point fallback
    system("wifi.ap.enable", ParamKind::Bool),
    system("wifi.ap.ssid.name", ParamKind::Text),
    system("wifi.ap.ssid.pass", ParamKind::Text),
    // Recovery button and status LED wiring
    system("ui.btn.enable", ParamKind::Bool),
    system("ui.btn.gpio", ParamKind::UInt32),
    system("ui.btn.gpio.active", ParamKind::Bool),
    system("ui.btn.adc", ParamKind::Bool),
    system("ui.btn.adc.thresh", ParamKind::UInt32),
    system("ui.btn.adc.thresh.gt", ParamKind::Bool),
    system("ui.led.enable", ParamKind::Bool),
    system("ui.led.gpio", ParamKind::UInt32),
    system("ui.led.gpio.active", ParamKind::Bool),
];

/// Look up a schema entry by key name
pub fn find(name: &str) -> Option<&'static KeyDef> {
    KEYS.iter().find(|def| def.name == name)
}

/// Value kind for a key, `None` when the key is outside the schema
pub fn kind_for(name: &str) -> Option<ParamKind> {
    find(name).map(|def| def.kind)
}

/// Seed station credentials captured at build time
///
/// Writes `wifi.ssid.name` / `wifi.ssid.pass` when build-time credentials
/// were provided and the store does not already carry an SSID. Never
/// overwrites operator configuration.
pub fn seed_station_credentials<F: FlashInterface>(
    store: &mut ParamStore<F>,
) -> Result<(), ParamError> {
    seed_credentials(store, env!("SLOTBOOT_SSID"), env!("SLOTBOOT_PASS"))
}

fn seed_credentials<F: FlashInterface>(
    store: &mut ParamStore<F>,
    ssid: &str,
    pass: &str,
) -> Result<(), ParamError> {
    if ssid.is_empty() {
        return Ok(());
    }
    match store.get(STATION_SSID, ParamKind::Text) {
        Ok(_) | Err(ParamError::TypeMismatch) => return Ok(()),
        Err(ParamError::NotFound) => {}
        Err(e) => return Err(e),
    }
    let (Some(name), Some(secret)) = (ParamValue::text(ssid), ParamValue::text(pass)) else {
        // Oversized build-time credentials are dropped rather than truncated
        return Ok(());
    };
    store.set(STATION_SSID, &name)?;
    store.set(STATION_PASS, &secret)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockFlash;

    fn formatted_store() -> ParamStore<MockFlash> {
        let mut store = ParamStore::new(MockFlash::new());
        let region = store.default_region();
        store.format(region).unwrap();
        store
    }

    #[test]
    fn test_schema_lookup() {
        assert_eq!(kind_for("wifi.ssid.name"), Some(ParamKind::Text));
        assert_eq!(kind_for("node.id"), Some(ParamKind::UInt32));
        assert_eq!(kind_for("tftp.server.enable"), Some(ParamKind::Bool));
        assert_eq!(kind_for("secur.aeskey"), Some(ParamKind::Binary));
        assert_eq!(kind_for("made.up.key"), None);
    }

    #[test]
    fn test_system_split() {
        assert!(!find("node.name").unwrap().flags.contains(KeyFlags::SYSTEM));
        assert!(find("secur.aeskey").unwrap().flags.contains(KeyFlags::SYSTEM));
        assert!(find("ui.led.gpio").unwrap().flags.contains(KeyFlags::SYSTEM));
    }

    #[test]
    fn test_key_names_fit_store_limits() {
        use crate::params::value::MAX_KEY_LEN;
        for def in KEYS {
            assert!(!def.name.is_empty());
            assert!(def.name.len() <= MAX_KEY_LEN, "key too long: {}", def.name);
        }
    }

    #[test]
    fn test_no_duplicate_keys() {
        for (i, def) in KEYS.iter().enumerate() {
            assert!(
                KEYS[i + 1..].iter().all(|other| other.name != def.name),
                "duplicate key: {}",
                def.name
            );
        }
    }

    #[test]
    fn test_seed_noop_without_build_credentials() {
        let mut store = formatted_store();
        seed_credentials(&mut store, "", "").unwrap();
        assert_eq!(
            store.get(STATION_SSID, ParamKind::Text),
            Err(ParamError::NotFound)
        );
    }

    #[test]
    fn test_seed_writes_when_absent() {
        let mut store = formatted_store();
        seed_credentials(&mut store, "buildnet", "buildpass").unwrap();
        assert_eq!(
            store.get(STATION_SSID, ParamKind::Text),
            Ok(ParamValue::text("buildnet").unwrap())
        );
        assert_eq!(
            store.get(STATION_PASS, ParamKind::Text),
            Ok(ParamValue::text("buildpass").unwrap())
        );
    }

    #[test]
    fn test_seed_never_overwrites() {
        let mut store = formatted_store();
        store
            .set(STATION_SSID, &ParamValue::text("operator-net").unwrap())
            .unwrap();
        seed_credentials(&mut store, "buildnet", "buildpass").unwrap();
        assert_eq!(
            store.get(STATION_SSID, ParamKind::Text),
            Ok(ParamValue::text("operator-net").unwrap())
        );
        assert_eq!(
            store.get(STATION_PASS, ParamKind::Text),
            Err(ParamError::NotFound)
        );
    }

    #[test]
    fn test_seed_on_unformatted_store_fails() {
        let mut store = ParamStore::new(MockFlash::new());
        assert_eq!(
            seed_credentials(&mut store, "buildnet", "x"),
            Err(ParamError::Corrupt)
        );
    }
}
