//! Deterministic input replay
//!
//! A replay session starts the machine from a recorded snapshot and then
//! feeds it one recorded input record per emulated frame, in place of live
//! input, until the log runs out.
//!
//! ```text
//! Disabled                          (paths not configured)
//! Loading ──ok──▶ Loaded ──log exhausted──▶ Finished
//!    └──error──▶ LoadFailed
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut replay = ReplayDriver::new(config.replay.clone());
//! replay.initialize(&mut machine)?;
//!
//! // Once per emulated frame, before advancing the machine:
//! match replay.apply_frame(&mut machine) {
//!     FrameInput::Inactive => frontend.poll_input(&mut machine, true),
//!     FrameInput::Applied(_) | FrameInput::Finished => {}
//! }
//! ```

use std::path::Path;

use crate::bindings::{self, BindingSet};
use crate::config::ReplayConfig;
use crate::error::{ReplayError, ReplayFile};
use crate::input_log::{InputLog, InputRecord};
use crate::machine::Machine;
use crate::state::{self, RestoreReport};


/// Lifecycle of a replay session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayState {
    /// Replay not configured; live input drives the machine
    Disabled,
    /// Configured, waiting for [`ReplayDriver::initialize`]
    Loading,
    /// Snapshot restored, feeding recorded input
    Loaded,
    /// Input log exhausted
    Finished,
    /// Startup failed; the run must not continue with this session
    LoadFailed,
}

/// What happened to the machine's inputs for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameInput {
    /// Replay is not feeding this frame (disabled or not yet loaded)
    Inactive,
    /// A recorded record was written into the bound controls
    Applied(InputRecord),
    /// The log is exhausted; nothing was written
    Finished,
}

/// Result of a successful replay load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    /// Records available in the input log
    pub frames: usize,
    /// Controls bound to recorded bits
    pub bindings: usize,
    pub restore: RestoreReport,
}

/// Drives a machine's inputs from a recorded log
#[derive(Debug)]
pub struct ReplayDriver {
    config: ReplayConfig,
    state: ReplayState,
    log: InputLog,
    bindings: BindingSet,
}

impl ReplayDriver {
    /// Create a session; it is enabled iff both paths are configured
    pub fn new(config: ReplayConfig) -> Self {
        let state = if config.is_enabled() {
            ReplayState::Loading
        } else {
            ReplayState::Disabled
        };
        Self {
            config,
            state,
            log: InputLog::from_records(&[]),
            bindings: BindingSet::new(),
        }
    }

    /// A session that never feeds input
    pub fn disabled() -> Self {
        Self::new(ReplayConfig::default())
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    /// Whether recorded input replaces live input for this run.
    ///
    /// True for every configured session, including one that has finished
    /// or failed to load: live devices must never leak into a replay run.
    pub fn is_enabled(&self) -> bool {
        self.state != ReplayState::Disabled
    }

    pub fn is_loaded(&self) -> bool {
        self.state == ReplayState::Loaded
    }

    pub fn is_finished(&self) -> bool {
        self.state == ReplayState::Finished
    }

    pub fn bindings(&self) -> &BindingSet {
        &self.bindings
    }

    /// Read the configured files and load them into `machine`.
    ///
    /// Returns `Ok(None)` when replay is disabled or already initialized.
    ///
    /// # Errors
    ///
    /// Any failure leaves the session in [`ReplayState::LoadFailed`]. The
    /// caller is expected to abort startup rather than run a half-configured
    /// replay.
    pub fn initialize<M: Machine + ?Sized>(
        &mut self,
        machine: &mut M,
    ) -> Result<Option<LoadSummary>, ReplayError> {
        if self.state != ReplayState::Loading {
            return Ok(None);
        }

        let files = read_file(&self.config.state_path, ReplayFile::State).and_then(|blob| {
            let inputs = read_file(&self.config.inputs_path, ReplayFile::Inputs)?;
            Ok((blob, inputs))
        });
        let (blob, inputs) = match files {
            Ok(files) => files,
            Err(err) => {
                self.fail(&err);
                return Err(err);
            }
        };

        self.load_from_bytes(machine, &blob, inputs).map(Some)
    }

    /// Load an in-memory snapshot and input log into `machine`.
    ///
    /// The log is validated before the snapshot is touched, so a bad log
    /// never reaches the machine.
    pub(crate) fn load_from_bytes<M: Machine + ?Sized>(
        &mut self,
        machine: &mut M,
        state_blob: &[u8],
        inputs: Vec<u8>,
    ) -> Result<LoadSummary, ReplayError> {
        self.state = ReplayState::Loading;

        let result = InputLog::new(inputs).and_then(|log| {
            let restore = state::restore(machine, state_blob)?;
            Ok((log, restore))
        });
        let (log, restore) = match result {
            Ok(loaded) => loaded,
            Err(err) => {
                self.fail(&err);
                return Err(err);
            }
        };

        self.bindings = bindings::build(machine);
        self.log = log;
        self.state = ReplayState::Loaded;

        let summary = LoadSummary {
            frames: self.log.frame_count(),
            bindings: self.bindings.len(),
            restore,
        };
        tracing::info!(
            version = restore.version,
            checksum = %format!("{:016x}", restore.checksum),
            "Replay loaded: {} frames, {} input bindings",
            summary.frames,
            summary.bindings
        );
        Ok(summary)
    }

    /// Write the next recorded record into the bound controls.
    ///
    /// On exhaustion the session moves to [`ReplayState::Finished`] and the
    /// frame receives no input. Bindings are written in scan order, so when
    /// two controls share a bit the later one is written last.
    pub fn apply_frame<M: Machine + ?Sized>(&mut self, machine: &mut M) -> FrameInput {
        match self.state {
            ReplayState::Loaded => {}
            ReplayState::Finished => return FrameInput::Finished,
            _ => return FrameInput::Inactive,
        }

        let Some(record) = self.log.next_record() else {
            tracing::info!(frames = self.log.frames_read(), "Replay finished");
            self.state = ReplayState::Finished;
            return FrameInput::Finished;
        };

        for binding in &self.bindings {
            machine.set_control(binding.slot, record.pressed(binding.player, binding.bit));
        }
        FrameInput::Applied(record)
    }

    fn fail(&mut self, err: &ReplayError) {
        tracing::error!("{err}");
        self.state = ReplayState::LoadFailed;
        self.bindings.clear();
    }
}

fn read_file(path: &Path, kind: ReplayFile) -> Result<Vec<u8>, ReplayError> {
    std::fs::read(path).map_err(|source| ReplayError::Io {
        kind,
        path: path.to_path_buf(),
        source,
    })
}
