//! Snapshot container header detection

use byteorder::{ByteOrder, LittleEndian};

use crate::error::ReplayError;

/// Magic tag of a versioned snapshot header.
///
/// The four-character code `GGPO` stored in the same little-endian order as
/// the length and version fields, so the file starts with the bytes `OPGG`.
pub const STATE_MAGIC: u32 = u32::from_be_bytes(*b"GGPO");

/// Size of the fixed header fields (magic, length, version)
pub const HEADER_FIELDS_SIZE: usize = 12;

/// Smallest blob that is checked for a header; anything shorter is payload
pub const HEADER_DETECT_SIZE: usize = 24;

/// Result of splitting a snapshot blob into header and payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedSnapshot<'a> {
    /// Bytes handed to the machine's state scan
    pub payload: &'a [u8],
    /// Format version declared by the header, if one was present
    pub version: Option<u32>,
    /// Bytes skipped before the payload (0 without a header)
    pub header_len: usize,
}

impl ParsedSnapshot<'_> {
    /// Format version to restore with, falling back to the machine's native one
    pub fn version_or(&self, default: u32) -> u32 {
        self.version.unwrap_or(default)
    }

    /// xxh3 checksum of the payload, for load diagnostics
    pub fn checksum(&self) -> u64 {
        xxhash_rust::xxh3::xxh3_64(self.payload)
    }
}

/// Split a snapshot blob into its optional header and payload.
///
/// A blob shorter than [`HEADER_DETECT_SIZE`], or whose first four bytes are
/// not [`STATE_MAGIC`], is payload in its entirety. A recognised header must declare a length in
/// `[HEADER_FIELDS_SIZE, blob.len()]`; the extra header bytes past the fixed
/// fields are skipped unread.
pub fn parse(blob: &[u8]) -> Result<ParsedSnapshot<'_>, ReplayError> {
    if blob.is_empty() {
        return Err(ReplayError::EmptySnapshot);
    }

    if blob.len() < HEADER_DETECT_SIZE || LittleEndian::read_u32(&blob[0..4]) != STATE_MAGIC {
        return Ok(ParsedSnapshot {
            payload: blob,
            version: None,
            header_len: 0,
        });
    }

    let header_len = LittleEndian::read_i32(&blob[4..8]);
    let version = LittleEndian::read_u32(&blob[8..12]);

    let valid = usize::try_from(header_len)
        .ok()
        .filter(|len| (HEADER_FIELDS_SIZE..=blob.len()).contains(len));
    let Some(len) = valid else {
        return Err(ReplayError::MalformedHeader {
            header_len,
            blob_len: blob.len(),
        });
    };

    Ok(ParsedSnapshot {
        payload: &blob[len..],
        version: Some(version),
        header_len: len,
    })
}

/// Build a header for `payload` (test fixtures and tooling)
pub fn encode(version: u32, extra: &[u8], payload: &[u8]) -> Vec<u8> {
    let header_len = HEADER_FIELDS_SIZE + extra.len();
    let mut out = vec![0u8; header_len];
    LittleEndian::write_u32(&mut out[0..4], STATE_MAGIC);
    LittleEndian::write_u32(&mut out[4..8], header_len as u32);
    LittleEndian::write_u32(&mut out[8..12], version);
    out[HEADER_FIELDS_SIZE..].copy_from_slice(extra);
    out.extend_from_slice(payload);
    out
}
