//! Error types for replay activation
//!
//! Every variant is fatal to replay startup. Per-frame conditions such as log
//! exhaustion are not errors; they surface as [`ReplayState::Finished`].
//!
//! [`ReplayState::Finished`]: crate::replay::ReplayState::Finished

use std::io;
use std::path::PathBuf;

use crate::input_log::RECORD_STRIDE;

/// Error activating a replay session
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// A snapshot or input log file could not be read
    #[error("failed to read replay {kind}: {}", .path.display())]
    Io {
        /// Which of the two replay files failed
        kind: ReplayFile,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Input log size is not a whole number of records
    #[error(
        "replay inputs blob size must be a multiple of {stride} bytes, got {len}",
        stride = RECORD_STRIDE
    )]
    InvalidLogFormat { len: usize },

    /// Snapshot blob has no bytes at all
    #[error("replay state blob is empty")]
    EmptySnapshot,

    /// Declared header length is outside `[12, blob length]`
    #[error("replay state header size is invalid ({header_len}, blob is {blob_len} bytes)")]
    MalformedHeader { header_len: i32, blob_len: usize },

    /// Snapshot payload ran out before the machine finished its state scan
    #[error(
        "replay state blob is too small for this driver ({requested} bytes requested, {available} available)"
    )]
    RestoreUnderrun { requested: usize, available: usize },
}

/// Identifies one of the two files a replay session reads at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayFile {
    State,
    Inputs,
}

impl std::fmt::Display for ReplayFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::State => write!(f, "state blob"),
            Self::Inputs => write!(f, "inputs blob"),
        }
    }
}

/// Error loading a run configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but cannot drive the scheduler
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}
