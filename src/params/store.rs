//! Flash-backed typed parameter store
//!
//! Persistent key-value storage in a dedicated flash region, with CRC
//! validation and a two-phase format so an interrupted write is always
//! detectable. All parameter data lives in the first sector of the region;
//! the remaining sectors are reserved headroom.
//!
//! # Flash Region Format
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ Area magic: [u8; 4] = b"SBPA"                 │  Offset: 0
//! ├───────────────────────────────────────────────┤
//! │ Layout version: u32 = 1                       │  Offset: 4
//! ├───────────────────────────────────────────────┤
//! │ Sector count: u32                             │  Offset: 8
//! ├───────────────────────────────────────────────┤
//! │ Data magic: [u8; 4] = b"SBPD"                 │  Offset: 12
//! ├───────────────────────────────────────────────┤
//! │ Entry count: u32                              │  Offset: 16
//! ├───────────────────────────────────────────────┤
//! │ Entries: [key len u8 | key | kind u8 | value] │  Offset: 20
//! │   Text/Binary values carry a u16 LE length    │
//! ├───────────────────────────────────────────────┤
//! │ CRC32: u32 over offsets 12..entries end       │  After entries
//! └───────────────────────────────────────────────┘
//! ```
//!
//! The area header (offsets 0..12) is written by phase one of `format`, the
//! data section by phase two. A region whose area header parses but whose
//! data section fails CRC or structural validation reads as uninitialized;
//! repeating `format` converges to a valid empty store.

use crate::log_debug;
use crate::params::error::ParamError;
use crate::params::value::{ParamKind, ParamValue, MAX_BINARY_LEN, MAX_KEY_LEN, MAX_TEXT_LEN};
use crate::platform::traits::FlashInterface;
use crc::{Crc, CRC_32_ISO_HDLC};
use heapless::String;

/// Flash sector size assumed by the region addressing scheme
pub const SECTOR_BYTES: u32 = 4096;

/// Default number of sectors in a freshly created store region
pub const DEFAULT_STORE_SECTORS: u32 = 4;

/// Sectors reserved at the top of flash above the store region
const RESERVED_TAIL_SECTORS: u32 = 4;

/// Largest region the header scan will look for
const MAX_STORE_SECTORS: u32 = 16;

/// Area header magic ("SlotBoot Param Area")
const AREA_MAGIC: [u8; 4] = *b"SBPA";

/// Data section magic ("SlotBoot Param Data")
const DATA_MAGIC: [u8; 4] = *b"SBPD";

/// Region layout version
const LAYOUT_VERSION: u32 = 1;

/// Area header length in bytes
const AREA_HDR_LEN: usize = 12;

/// Data section header length in bytes (magic + entry count)
const DATA_HDR_LEN: usize = 8;

/// Byte offset of the data section within the region
const DATA_START: usize = AREA_HDR_LEN;

/// Byte offset of the first entry within the region
const ENTRIES_START: usize = AREA_HDR_LEN + DATA_HDR_LEN;

/// Upper bound on a credible entry count, for rejecting erased or
/// corrupted count fields before walking entries
const MAX_ENTRY_COUNT: u32 = SECTOR_BYTES / 4;

/// CRC sealing the data section, stored little endian after the last entry
const DATA_CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Store region descriptor: base address and sector count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Region {
    /// Base flash address, sector aligned
    pub base: u32,
    /// Region length in sectors
    pub sectors: u32,
}

impl Region {
    /// Default region for a chip of the given size: four sectors placed
    /// below the reserved tail at the top of flash
    pub fn default_for(chip_size: u32) -> Self {
        let sectors = DEFAULT_STORE_SECTORS;
        Self {
            base: chip_size - (RESERVED_TAIL_SECTORS + sectors) * SECTOR_BYTES,
            sectors,
        }
    }

    /// Region length in bytes
    pub fn size_bytes(&self) -> u32 {
        self.sectors * SECTOR_BYTES
    }
}

/// One stored parameter, as yielded by iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter key
    pub key: String<MAX_KEY_LEN>,
    /// Parameter value
    pub value: ParamValue,
}

/// Borrowed view of one entry inside a sector buffer
struct EntryRef<'a> {
    key: &'a str,
    kind: ParamKind,
    /// Kind-specific payload (length prefix stripped for Text/Binary)
    payload: &'a [u8],
    /// Whole encoded entry, for raw copying
    span: &'a [u8],
}

/// Parameter store over a flash region
///
/// The store holds no cached parameter state: every operation reads the
/// region afresh, locating it by scanning candidate base addresses for a
/// valid area header. A store whose region has no valid area header, or
/// whose data section fails validation, reports [`ParamError::Corrupt`]
/// until `format` runs.
pub struct ParamStore<F: FlashInterface> {
    flash: F,
}

impl<F: FlashInterface> ParamStore<F> {
    /// Create a store over the given flash handle
    pub fn new(flash: F) -> Self {
        Self { flash }
    }

    /// Default region for this flash part's capacity
    pub fn default_region(&self) -> Region {
        Region::default_for(self.flash.capacity())
    }

    /// Direct access to the underlying flash handle
    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Locate the live store region
    ///
    /// Scans candidate base addresses (one per admissible sector count)
    /// for a valid area header. Fails with [`ParamError::Corrupt`] when no
    /// area exists.
    pub fn region_info(&mut self) -> Result<Region, ParamError> {
        self.scan_region()
    }

    /// Read the value stored under `key`, checking it has the given kind
    pub fn get(&mut self, key: &str, kind: ParamKind) -> Result<ParamValue, ParamError> {
        validate_key(key)?;
        let region = self.scan_region()?;
        let mut buf = [0u8; SECTOR_BYTES as usize];
        self.flash.read(region.base, &mut buf)?;

        let (count, _end) = validate_data(&buf)?;
        let mut offset = ENTRIES_START;
        for _ in 0..count {
            let entry = parse_entry(&buf, &mut offset)?;
            if entry.key == key {
                if entry.kind != kind {
                    return Err(ParamError::TypeMismatch);
                }
                return decode_value(&entry);
            }
        }
        Err(ParamError::NotFound)
    }

    /// Write `value` under `key`, replacing any existing entry
    ///
    /// The data sector is rebuilt in memory, then committed with an erase
    /// and a single write. Power loss during the commit leaves the region
    /// invalid; `format` recovers it. A `set` that cannot fit leaves flash
    /// untouched.
    pub fn set(&mut self, key: &str, value: &ParamValue) -> Result<(), ParamError> {
        validate_key(key)?;
        let region = self.scan_region()?;
        let mut current = [0u8; SECTOR_BYTES as usize];
        self.flash.read(region.base, &mut current)?;
        let (count, _end) = validate_data(&current)?;

        let mut image = [0xFFu8; SECTOR_BYTES as usize];
        image[0..4].copy_from_slice(&AREA_MAGIC);
        image[4..8].copy_from_slice(&LAYOUT_VERSION.to_le_bytes());
        image[8..12].copy_from_slice(&region.sectors.to_le_bytes());
        image[12..16].copy_from_slice(&DATA_MAGIC);

        // Carry over every entry except the one being replaced
        let mut offset = ENTRIES_START;
        let mut out = ENTRIES_START;
        let mut kept = 0u32;
        for _ in 0..count {
            let entry = parse_entry(&current, &mut offset)?;
            if entry.key == key {
                continue;
            }
            let end = out + entry.span.len();
            if end > payload_limit() {
                return Err(ParamError::StoreFull);
            }
            image[out..end].copy_from_slice(entry.span);
            out = end;
            kept += 1;
        }

        encode_entry(&mut image, &mut out, key, value)?;
        let total = kept + 1;
        image[16..20].copy_from_slice(&total.to_le_bytes());

        let crc = DATA_CRC.checksum(&image[DATA_START..out]);
        image[out..out + 4].copy_from_slice(&crc.to_le_bytes());
        let written = out + 4;

        self.flash.erase(region.base, SECTOR_BYTES)?;
        self.flash.write(region.base, &image[..written])?;
        Ok(())
    }

    /// Iterate over all stored parameters in on-flash order
    ///
    /// Entries are read from flash lazily, one per step. A flash error or
    /// structural corruption mid-sequence yields one `Err` and ends the
    /// iteration; parameters already yielded remain valid, and the store
    /// stays usable afterwards. Calling `iter` again restarts from the
    /// first entry.
    pub fn iter(&mut self) -> ParamIter<'_, F> {
        let setup = self.iter_setup();
        match setup {
            Ok((base, count)) => ParamIter {
                flash: &mut self.flash,
                base,
                offset: ENTRIES_START,
                remaining: count,
                pending: None,
                done: false,
            },
            Err(e) => ParamIter {
                flash: &mut self.flash,
                base: 0,
                offset: 0,
                remaining: 0,
                pending: Some(e),
                done: false,
            },
        }
    }

    /// Create the store region and initialize it empty
    ///
    /// Phase one erases the whole region and writes the area header; phase
    /// two writes an empty, CRC-sealed data section. Interrupting either
    /// phase leaves the region invalid, and repeating `format` converges
    /// to a valid empty store regardless of prior contents.
    pub fn format(&mut self, region: Region) -> Result<(), ParamError> {
        if region.sectors == 0 || region.sectors > MAX_STORE_SECTORS {
            return Err(ParamError::Io(
                crate::platform::error::FlashError::InvalidAddress.into(),
            ));
        }

        // Phase one: create the area
        self.flash.erase(region.base, region.size_bytes())?;
        let mut hdr = [0u8; AREA_HDR_LEN];
        hdr[0..4].copy_from_slice(&AREA_MAGIC);
        hdr[4..8].copy_from_slice(&LAYOUT_VERSION.to_le_bytes());
        hdr[8..12].copy_from_slice(&region.sectors.to_le_bytes());
        self.flash.write(region.base, &hdr)?;

        // Phase two: initialize the empty data section
        let mut data = [0u8; DATA_HDR_LEN + 4];
        data[0..4].copy_from_slice(&DATA_MAGIC);
        data[4..8].copy_from_slice(&0u32.to_le_bytes());
        let crc = DATA_CRC.checksum(&data[..DATA_HDR_LEN]);
        data[DATA_HDR_LEN..].copy_from_slice(&crc.to_le_bytes());
        self.flash
            .write(region.base + DATA_START as u32, &data)?;
        log_debug!(
            "parameter area formatted: {} sectors at 0x{:08x}",
            region.sectors,
            region.base
        );
        Ok(())
    }

    /// Scan candidate bases for a valid area header
    fn scan_region(&mut self) -> Result<Region, ParamError> {
        let capacity = self.flash.capacity();
        for sectors in 1..=MAX_STORE_SECTORS {
            let span = (RESERVED_TAIL_SECTORS + sectors) * SECTOR_BYTES;
            let Some(base) = capacity.checked_sub(span) else {
                break;
            };
            let mut hdr = [0u8; AREA_HDR_LEN];
            self.flash.read(base, &mut hdr)?;
            if parse_area_header(&hdr) == Some(sectors) {
                return Ok(Region { base, sectors });
            }
        }
        Err(ParamError::Corrupt)
    }

    /// Locate the region and structurally validate the data header for
    /// lazy iteration
    fn iter_setup(&mut self) -> Result<(u32, u32), ParamError> {
        let region = self.scan_region()?;
        let mut hdr = [0u8; DATA_HDR_LEN];
        self.flash.read(region.base + DATA_START as u32, &mut hdr)?;
        if hdr[0..4] != DATA_MAGIC {
            return Err(ParamError::Corrupt);
        }
        let count = u32::from_le_bytes([hdr[4], hdr[5], hdr[6], hdr[7]]);
        if count > MAX_ENTRY_COUNT {
            return Err(ParamError::Corrupt);
        }
        Ok((region.base, count))
    }
}

/// Lazy parameter iterator
///
/// Yields `Result<Parameter, ParamError>`; fuses after the first error.
pub struct ParamIter<'a, F: FlashInterface> {
    flash: &'a mut F,
    base: u32,
    offset: usize,
    remaining: u32,
    pending: Option<ParamError>,
    done: bool,
}

impl<F: FlashInterface> ParamIter<'_, F> {
    fn read_at(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), ParamError> {
        if offset + buf.len() > SECTOR_BYTES as usize {
            return Err(ParamError::Corrupt);
        }
        self.flash.read(self.base + offset as u32, buf)?;
        Ok(())
    }

    fn next_parameter(&mut self) -> Result<Parameter, ParamError> {
        let mut len_buf = [0u8; 1];
        self.read_at(self.offset, &mut len_buf)?;
        let key_len = len_buf[0] as usize;
        if key_len == 0 || key_len > MAX_KEY_LEN {
            return Err(ParamError::Corrupt);
        }

        // Key and kind tag in one read
        let mut key_buf = [0u8; MAX_KEY_LEN + 1];
        self.read_at(self.offset + 1, &mut key_buf[..key_len + 1])?;
        let key_str =
            core::str::from_utf8(&key_buf[..key_len]).map_err(|_| ParamError::Corrupt)?;
        let key = String::try_from(key_str).map_err(|_| ParamError::Corrupt)?;
        let kind = ParamKind::from_code(key_buf[key_len]).ok_or(ParamError::Corrupt)?;

        let mut offset = self.offset + 1 + key_len + 1;
        let value = match kind {
            ParamKind::Text | ParamKind::Binary => {
                let mut len_bytes = [0u8; 2];
                self.read_at(offset, &mut len_bytes)?;
                let len = u16::from_le_bytes(len_bytes) as usize;
                offset += 2;
                let limit = if kind == ParamKind::Text {
                    MAX_TEXT_LEN
                } else {
                    MAX_BINARY_LEN
                };
                if len > limit {
                    return Err(ParamError::Corrupt);
                }
                let mut payload = [0u8; MAX_TEXT_LEN];
                self.read_at(offset, &mut payload[..len])?;
                offset += len;
                if kind == ParamKind::Text {
                    let text = core::str::from_utf8(&payload[..len])
                        .map_err(|_| ParamError::Corrupt)?;
                    ParamValue::text(text).ok_or(ParamError::Corrupt)?
                } else {
                    ParamValue::binary(&payload[..len]).ok_or(ParamError::Corrupt)?
                }
            }
            ParamKind::UInt32 => {
                let mut word = [0u8; 4];
                self.read_at(offset, &mut word)?;
                offset += 4;
                ParamValue::UInt32(u32::from_le_bytes(word))
            }
            ParamKind::Bool => {
                let mut byte = [0u8; 1];
                self.read_at(offset, &mut byte)?;
                offset += 1;
                match byte[0] {
                    0 => ParamValue::Bool(false),
                    1 => ParamValue::Bool(true),
                    _ => return Err(ParamError::Corrupt),
                }
            }
        };

        self.offset = offset;
        self.remaining -= 1;
        Ok(Parameter { key, value })
    }
}

impl<F: FlashInterface> Iterator for ParamIter<'_, F> {
    type Item = Result<Parameter, ParamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(e) = self.pending.take() {
            self.done = true;
            return Some(Err(e));
        }
        if self.remaining == 0 {
            self.done = true;
            return None;
        }
        match self.next_parameter() {
            Ok(param) => Some(Ok(param)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Last usable byte offset for entries, leaving room for the CRC
fn payload_limit() -> usize {
    SECTOR_BYTES as usize - 4
}

fn validate_key(key: &str) -> Result<(), ParamError> {
    if key.is_empty() || key.len() > MAX_KEY_LEN {
        return Err(ParamError::InvalidKey);
    }
    Ok(())
}

/// Parse an area header, returning the sector count when valid
fn parse_area_header(hdr: &[u8; AREA_HDR_LEN]) -> Option<u32> {
    if hdr[0..4] != AREA_MAGIC {
        return None;
    }
    let version = u32::from_le_bytes([hdr[4], hdr[5], hdr[6], hdr[7]]);
    if version != LAYOUT_VERSION {
        return None;
    }
    let sectors = u32::from_le_bytes([hdr[8], hdr[9], hdr[10], hdr[11]]);
    if sectors == 0 || sectors > MAX_STORE_SECTORS {
        return None;
    }
    Some(sectors)
}

/// Validate the data section of a sector buffer
///
/// Walks all entries structurally, then checks the CRC sealing the data
/// section. Returns the entry count and the offset just past the last
/// entry.
fn validate_data(buf: &[u8; SECTOR_BYTES as usize]) -> Result<(u32, usize), ParamError> {
    if buf[12..16] != DATA_MAGIC {
        return Err(ParamError::Corrupt);
    }
    let count = u32::from_le_bytes([buf[16], buf[17], buf[18], buf[19]]);
    if count > MAX_ENTRY_COUNT {
        return Err(ParamError::Corrupt);
    }

    let mut offset = ENTRIES_START;
    for _ in 0..count {
        parse_entry(buf, &mut offset)?;
    }
    if offset + 4 > SECTOR_BYTES as usize {
        return Err(ParamError::Corrupt);
    }
    let stored = u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ]);
    if DATA_CRC.checksum(&buf[DATA_START..offset]) != stored {
        return Err(ParamError::Corrupt);
    }
    Ok((count, offset))
}

/// Parse one entry at `*offset`, advancing the offset past it
fn parse_entry<'a>(buf: &'a [u8], offset: &mut usize) -> Result<EntryRef<'a>, ParamError> {
    let start = *offset;
    let key_len = *buf.get(start).ok_or(ParamError::Corrupt)? as usize;
    if key_len == 0 || key_len > MAX_KEY_LEN {
        return Err(ParamError::Corrupt);
    }
    let key_end = start + 1 + key_len;
    let kind_pos = key_end;
    if kind_pos + 1 > buf.len() {
        return Err(ParamError::Corrupt);
    }
    let key =
        core::str::from_utf8(&buf[start + 1..key_end]).map_err(|_| ParamError::Corrupt)?;
    let kind = ParamKind::from_code(buf[kind_pos]).ok_or(ParamError::Corrupt)?;

    let payload_start = kind_pos + 1;
    let (payload, end) = match kind {
        ParamKind::Text | ParamKind::Binary => {
            if payload_start + 2 > buf.len() {
                return Err(ParamError::Corrupt);
            }
            let len =
                u16::from_le_bytes([buf[payload_start], buf[payload_start + 1]]) as usize;
            let limit = if kind == ParamKind::Text {
                MAX_TEXT_LEN
            } else {
                MAX_BINARY_LEN
            };
            if len > limit || payload_start + 2 + len > buf.len() {
                return Err(ParamError::Corrupt);
            }
            (
                &buf[payload_start + 2..payload_start + 2 + len],
                payload_start + 2 + len,
            )
        }
        ParamKind::UInt32 => {
            if payload_start + 4 > buf.len() {
                return Err(ParamError::Corrupt);
            }
            (&buf[payload_start..payload_start + 4], payload_start + 4)
        }
        ParamKind::Bool => {
            if payload_start + 1 > buf.len() {
                return Err(ParamError::Corrupt);
            }
            (&buf[payload_start..payload_start + 1], payload_start + 1)
        }
    };
    if end > payload_limit() {
        return Err(ParamError::Corrupt);
    }

    *offset = end;
    Ok(EntryRef {
        key,
        kind,
        payload,
        span: &buf[start..end],
    })
}

/// Decode an entry's payload into a value
fn decode_value(entry: &EntryRef<'_>) -> Result<ParamValue, ParamError> {
    match entry.kind {
        ParamKind::Text => {
            let text = core::str::from_utf8(entry.payload).map_err(|_| ParamError::Corrupt)?;
            ParamValue::text(text).ok_or(ParamError::Corrupt)
        }
        ParamKind::UInt32 => {
            let word = [
                entry.payload[0],
                entry.payload[1],
                entry.payload[2],
                entry.payload[3],
            ];
            Ok(ParamValue::UInt32(u32::from_le_bytes(word)))
        }
        ParamKind::Bool => match entry.payload[0] {
            0 => Ok(ParamValue::Bool(false)),
            1 => Ok(ParamValue::Bool(true)),
            _ => Err(ParamError::Corrupt),
        },
        ParamKind::Binary => ParamValue::binary(entry.payload).ok_or(ParamError::Corrupt),
    }
}

/// Append one encoded entry to the sector image
fn encode_entry(
    image: &mut [u8],
    offset: &mut usize,
    key: &str,
    value: &ParamValue,
) -> Result<(), ParamError> {
    let value_len = match value {
        ParamValue::Text(s) => 2 + s.len(),
        ParamValue::Binary(b) => 2 + b.len(),
        ParamValue::UInt32(_) => 4,
        ParamValue::Bool(_) => 1,
    };
    let entry_len = 1 + key.len() + 1 + value_len;
    let start = *offset;
    if start + entry_len > payload_limit() {
        return Err(ParamError::StoreFull);
    }

    image[start] = key.len() as u8;
    image[start + 1..start + 1 + key.len()].copy_from_slice(key.as_bytes());
    let mut pos = start + 1 + key.len();
    image[pos] = value.kind().code();
    pos += 1;
    match value {
        ParamValue::Text(s) => {
            image[pos..pos + 2].copy_from_slice(&(s.len() as u16).to_le_bytes());
            pos += 2;
            image[pos..pos + s.len()].copy_from_slice(s.as_bytes());
            pos += s.len();
        }
        ParamValue::Binary(b) => {
            image[pos..pos + 2].copy_from_slice(&(b.len() as u16).to_le_bytes());
            pos += 2;
            image[pos..pos + b.len()].copy_from_slice(b);
            pos += b.len();
        }
        ParamValue::UInt32(v) => {
            image[pos..pos + 4].copy_from_slice(&v.to_le_bytes());
            pos += 4;
        }
        ParamValue::Bool(b) => {
            image[pos] = *b as u8;
            pos += 1;
        }
    }

    *offset = pos;
    Ok(())
}
