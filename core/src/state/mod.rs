//! Snapshot container parsing and state restore
//!
//! A snapshot is an optional versioned header followed by an opaque payload.
//! The payload is never interpreted here: the machine pulls it back in areas
//! through [`StateSource`](crate::machine::StateSource), in the same order it
//! wrote them.
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ magic "OPGG"         (4 bytes, opt.) │
//! │ header_len: i32 LE   (4 bytes, opt.) │
//! │ version: u32 LE      (4 bytes, opt.) │
//! │ extra header bytes   (header_len-12) │
//! ├──────────────────────────────────────┤
//! │ payload (machine state areas)        │
//! └──────────────────────────────────────┘
//! ```

mod cursor;
mod header;

pub use cursor::ScanCursor;
pub use header::{HEADER_DETECT_SIZE, HEADER_FIELDS_SIZE, ParsedSnapshot, STATE_MAGIC, encode, parse};

use crate::error::ReplayError;
use crate::machine::Machine;

/// Summary of a successful restore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreReport {
    /// Format version the machine restored with
    pub version: u32,
    /// Header bytes skipped
    pub header_len: usize,
    /// Payload bytes handed to the machine
    pub consumed: usize,
    /// Payload bytes the machine never asked for
    pub unread: usize,
    /// xxh3 of the payload
    pub checksum: u64,
}

/// Parse `blob` and restore it into `machine`.
///
/// The machine's scan always runs to completion, even after the payload runs
/// dry, so that its internal iteration is never left half-way. The underrun is
/// reported afterwards and the palette is only recomputed on success.
pub fn restore<M: Machine + ?Sized>(
    machine: &mut M,
    blob: &[u8],
) -> Result<RestoreReport, ReplayError> {
    let parsed = parse(blob)?;
    let version = parsed.version_or(machine.format_version());

    let mut cursor = ScanCursor::new(parsed.payload);
    machine.restore_state(&mut cursor, version);

    if cursor.underrun() {
        return Err(ReplayError::RestoreUnderrun {
            requested: cursor.requested(),
            available: parsed.payload.len(),
        });
    }

    machine.recalc_palette();

    Ok(RestoreReport {
        version,
        header_len: parsed.header_len,
        consumed: cursor.consumed(),
        unread: cursor.remaining(),
        checksum: parsed.checksum(),
    })
}
