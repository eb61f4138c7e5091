//! Recorded per-frame input log
//!
//! The log is a flat sequence of fixed 10-byte records, one per emulated
//! frame:
//!
//! ```text
//! offset  0..2   player 0 button mask (u16 LE)
//! offset  2..5   unused
//! offset  5..7   player 1 button mask (u16 LE)
//! offset  7..10  unused
//! ```

use byteorder::{ByteOrder, LittleEndian};

use crate::error::ReplayError;

/// Size of one input record in bytes
pub const RECORD_STRIDE: usize = 10;

/// Number of players carried by a record
pub const RECORD_PLAYERS: usize = 2;

const PLAYER_MASK_OFFSETS: [usize; RECORD_PLAYERS] = [0, 5];

/// Button masks for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputRecord {
    pub masks: [u16; RECORD_PLAYERS],
}

impl InputRecord {
    pub fn new(mask0: u16, mask1: u16) -> Self {
        Self {
            masks: [mask0, mask1],
        }
    }

    /// Decode a record from exactly [`RECORD_STRIDE`] bytes
    pub fn decode(bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len(), RECORD_STRIDE);
        let mut masks = [0u16; RECORD_PLAYERS];
        for (mask, offset) in masks.iter_mut().zip(PLAYER_MASK_OFFSETS) {
            *mask = LittleEndian::read_u16(&bytes[offset..offset + 2]);
        }
        Self { masks }
    }

    /// Encode into a record with zeroed unused bytes
    pub fn encode(&self) -> [u8; RECORD_STRIDE] {
        let mut out = [0u8; RECORD_STRIDE];
        for (mask, offset) in self.masks.iter().zip(PLAYER_MASK_OFFSETS) {
            LittleEndian::write_u16(&mut out[offset..offset + 2], *mask);
        }
        out
    }

    /// Whether `bit` is set in `player`'s mask (players past the record read as released)
    pub fn pressed(&self, player: u8, bit: u8) -> bool {
        self.masks
            .get(player as usize)
            .and_then(|mask| mask.checked_shr(u32::from(bit)))
            .is_some_and(|shifted| shifted & 1 != 0)
    }
}

/// Forward-only reader over a validated input log
#[derive(Debug, Clone)]
pub struct InputLog {
    data: Vec<u8>,
    offset: usize,
}

impl InputLog {
    /// Validate and wrap a log.
    ///
    /// # Errors
    /// Returns [`ReplayError::InvalidLogFormat`] if the length is not a whole
    /// number of records.
    pub fn new(data: Vec<u8>) -> Result<Self, ReplayError> {
        if data.len() % RECORD_STRIDE != 0 {
            return Err(ReplayError::InvalidLogFormat { len: data.len() });
        }
        Ok(Self { data, offset: 0 })
    }

    /// Build a log from records (tests and tooling)
    pub fn from_records(records: &[InputRecord]) -> Self {
        Self {
            data: records.iter().flat_map(InputRecord::encode).collect(),
            offset: 0,
        }
    }

    /// Next record, or `None` once fewer than [`RECORD_STRIDE`] bytes remain
    pub fn next_record(&mut self) -> Option<InputRecord> {
        let end = self.offset.checked_add(RECORD_STRIDE)?;
        let bytes = self.data.get(self.offset..end)?;
        self.offset = end;
        Some(InputRecord::decode(bytes))
    }

    /// Total number of records in the log
    pub fn frame_count(&self) -> usize {
        self.data.len() / RECORD_STRIDE
    }

    /// Records consumed so far
    pub fn frames_read(&self) -> usize {
        self.offset / RECORD_STRIDE
    }

    /// Records not yet consumed
    pub fn remaining(&self) -> usize {
        self.frame_count() - self.frames_read()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Iterate all records from the start without moving the cursor
    pub fn records(&self) -> impl Iterator<Item = InputRecord> + '_ {
        self.data.chunks_exact(RECORD_STRIDE).map(InputRecord::decode)
    }
}
