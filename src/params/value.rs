//! Typed parameter values
//!
//! Every stored parameter carries one of four kinds. Values parse from and
//! format to the textual forms the command session uses, so the store and
//! the CLI agree on one representation.

use core::fmt;
use heapless::{String, Vec};

/// Maximum parameter key length in bytes
pub const MAX_KEY_LEN: usize = 32;

/// Maximum text value length in bytes
pub const MAX_TEXT_LEN: usize = 128;

/// Maximum binary value length in bytes
pub const MAX_BINARY_LEN: usize = 64;

/// Parameter value kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamKind {
    /// UTF-8 text, up to [`MAX_TEXT_LEN`] bytes
    Text,
    /// Unsigned 32-bit integer
    UInt32,
    /// Boolean flag
    Bool,
    /// Raw bytes, up to [`MAX_BINARY_LEN`]
    Binary,
}

impl ParamKind {
    /// On-flash kind code
    pub(crate) fn code(self) -> u8 {
        match self {
            ParamKind::Text => 0,
            ParamKind::UInt32 => 1,
            ParamKind::Bool => 2,
            ParamKind::Binary => 3,
        }
    }

    /// Decode an on-flash kind code
    pub(crate) fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ParamKind::Text),
            1 => Some(ParamKind::UInt32),
            2 => Some(ParamKind::Bool),
            3 => Some(ParamKind::Binary),
            _ => None,
        }
    }

    /// Kind name as shown by the `keys` command
    pub fn name(self) -> &'static str {
        match self {
            ParamKind::Text => "text",
            ParamKind::UInt32 => "uint32",
            ParamKind::Bool => "bool",
            ParamKind::Binary => "binary",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// UTF-8 text
    Text(String<MAX_TEXT_LEN>),
    /// Unsigned 32-bit integer
    UInt32(u32),
    /// Boolean flag
    Bool(bool),
    /// Raw bytes
    Binary(Vec<u8, MAX_BINARY_LEN>),
}

impl ParamValue {
    /// Kind tag of this value
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Text(_) => ParamKind::Text,
            ParamValue::UInt32(_) => ParamKind::UInt32,
            ParamValue::Bool(_) => ParamKind::Bool,
            ParamValue::Binary(_) => ParamKind::Binary,
        }
    }

    /// Build a text value, `None` if the input exceeds [`MAX_TEXT_LEN`]
    pub fn text(s: &str) -> Option<Self> {
        String::try_from(s).ok().map(ParamValue::Text)
    }

    /// Build a binary value, `None` if the input exceeds [`MAX_BINARY_LEN`]
    pub fn binary(bytes: &[u8]) -> Option<Self> {
        Vec::from_slice(bytes).ok().map(ParamValue::Binary)
    }

    /// Parse a value of the given kind from its textual form
    ///
    /// Accepted forms:
    /// - `Text`: taken verbatim
    /// - `UInt32`: decimal, or hex with a `0x` prefix
    /// - `Bool`: `true`/`false`, `on`/`off`, `1`/`0`
    /// - `Binary`: an even run of hex digits, no separators
    ///
    /// Returns `None` when the input does not fit the kind.
    pub fn parse(kind: ParamKind, input: &str) -> Option<Self> {
        match kind {
            ParamKind::Text => Self::text(input),
            ParamKind::UInt32 => {
                let parsed = match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
                    Some(hex) => u32::from_str_radix(hex, 16),
                    None => input.parse(),
                };
                parsed.ok().map(ParamValue::UInt32)
            }
            ParamKind::Bool => match input {
                "true" | "on" | "1" => Some(ParamValue::Bool(true)),
                "false" | "off" | "0" => Some(ParamValue::Bool(false)),
                _ => None,
            },
            ParamKind::Binary => {
                if input.is_empty() || input.len() % 2 != 0 {
                    return None;
                }
                let mut bytes = Vec::new();
                for pair in input.as_bytes().chunks(2) {
                    let hi = (pair[0] as char).to_digit(16)?;
                    let lo = (pair[1] as char).to_digit(16)?;
                    bytes.push(((hi << 4) | lo) as u8).ok()?;
                }
                Some(ParamValue::Binary(bytes))
            }
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::UInt32(v) => write!(f, "{}", v),
            ParamValue::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            ParamValue::Binary(bytes) => {
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes_round_trip() {
        for kind in [
            ParamKind::Text,
            ParamKind::UInt32,
            ParamKind::Bool,
            ParamKind::Binary,
        ] {
            assert_eq!(ParamKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ParamKind::from_code(4), None);
        assert_eq!(ParamKind::from_code(0xFF), None);
    }

    #[test]
    fn test_parse_uint32() {
        assert_eq!(
            ParamValue::parse(ParamKind::UInt32, "1883"),
            Some(ParamValue::UInt32(1883))
        );
        assert_eq!(
            ParamValue::parse(ParamKind::UInt32, "0x40000"),
            Some(ParamValue::UInt32(0x40000))
        );
        assert_eq!(ParamValue::parse(ParamKind::UInt32, "-1"), None);
        assert_eq!(ParamValue::parse(ParamKind::UInt32, "potato"), None);
        assert_eq!(ParamValue::parse(ParamKind::UInt32, ""), None);
    }

    #[test]
    fn test_parse_bool() {
        for input in ["true", "on", "1"] {
            assert_eq!(
                ParamValue::parse(ParamKind::Bool, input),
                Some(ParamValue::Bool(true))
            );
        }
        for input in ["false", "off", "0"] {
            assert_eq!(
                ParamValue::parse(ParamKind::Bool, input),
                Some(ParamValue::Bool(false))
            );
        }
        assert_eq!(ParamValue::parse(ParamKind::Bool, "yes"), None);
        assert_eq!(ParamValue::parse(ParamKind::Bool, "TRUE"), None);
    }

    #[test]
    fn test_parse_binary() {
        assert_eq!(
            ParamValue::parse(ParamKind::Binary, "deadBEEF"),
            ParamValue::binary(&[0xDE, 0xAD, 0xBE, 0xEF])
        );
        assert_eq!(ParamValue::parse(ParamKind::Binary, "abc"), None);
        assert_eq!(ParamValue::parse(ParamKind::Binary, "zz"), None);
        assert_eq!(ParamValue::parse(ParamKind::Binary, ""), None);
    }

    #[test]
    fn test_parse_text_respects_limit() {
        let long: std::string::String = core::iter::repeat('a').take(MAX_TEXT_LEN + 1).collect();
        assert_eq!(ParamValue::parse(ParamKind::Text, &long), None);

        let fits: std::string::String = core::iter::repeat('a').take(MAX_TEXT_LEN).collect();
        assert!(ParamValue::parse(ParamKind::Text, &fits).is_some());
    }

    #[test]
    fn test_display_forms() {
        let text = ParamValue::text("my network").unwrap();
        assert_eq!(format!("{}", text), "my network");
        assert_eq!(format!("{}", ParamValue::UInt32(8080)), "8080");
        assert_eq!(format!("{}", ParamValue::Bool(false)), "false");

        let bin = ParamValue::binary(&[0x00, 0xA5, 0xFF]).unwrap();
        assert_eq!(format!("{}", bin), "00a5ff");
    }
}
