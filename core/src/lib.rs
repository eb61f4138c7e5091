//! Arcade Replay Core - deterministic input replay and frame pacing
//!
//! This crate restores an emulated machine from a recorded snapshot, feeds it
//! a recorded per-frame input log, and paces emulation against wall-clock
//! time or the audio device.
//!
//! # Architecture
//!
//! - [`Machine`] / [`Frontend`] - collaborator contracts for the emulator and host
//! - [`state`] - snapshot container parsing and scan-driven restore
//! - [`InputLog`] - fixed-stride recorded input masks
//! - [`bindings`] - mapping recorded bits onto labelled driver controls
//! - [`ReplayDriver`] - replay session lifecycle and per-frame input
//! - [`FrameScheduler`] - frame throttle and pause/step/fast-forward policy
//! - [`ReplayRunner`] - init, loop and exit sequencing

pub mod bindings;
pub mod config;
pub mod error;
pub mod headless;
pub mod input_log;
pub mod machine;
pub mod replay;
pub mod runner;
pub mod scheduler;
pub mod state;

pub use bindings::{BindingSet, ControlBinding};
pub use config::{ReplayConfig, RunConfig, TimingConfig};
pub use error::{ConfigError, ReplayError, ReplayFile};
pub use headless::HeadlessMachine;
pub use input_log::{InputLog, InputRecord, RECORD_STRIDE};
pub use machine::{
    AutoState, ControlInfo, ControlKind, ControlSlot, FrameOutcome, Frontend, Machine, StateSource,
};
pub use replay::{FrameInput, LoadSummary, ReplayDriver, ReplayState};
pub use runner::{ReplayRunner, RunStatus, RunSummary};
pub use scheduler::{FrameCounters, FrameScheduler, FrameTargets, SpeedControl, TickReport, TimingRegime};
pub use state::{RestoreReport, ScanCursor};
