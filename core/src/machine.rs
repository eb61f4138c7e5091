//! Collaborator contracts for the emulated machine and its frontend
//!
//! The replay engine and frame scheduler never reach into emulation or
//! presentation directly. They drive a [`Machine`] (the execution engine that
//! advances frames, restores state and exposes control metadata) and a
//! [`Frontend`] (live input polling, presentation, audio blanking and the
//! automatic save slot).

/// Supplies snapshot bytes to a machine during a state restore.
///
/// The machine pulls its state in named areas, one request at a time, rather
/// than receiving a structured record. Each call fills `destination`
/// completely: bytes that cannot be supplied are zeroed.
pub trait StateSource {
    /// Fill `destination` with the next `destination.len()` bytes.
    ///
    /// Returns the number of bytes actually provided from the payload. A
    /// return value smaller than `destination.len()` means the remainder was
    /// zero-filled.
    fn fill(&mut self, destination: &mut [u8]) -> usize;
}

/// Kind of a driver control as reported by the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Digital on/off switch (buttons, joystick directions)
    Switch,
    /// Analog axis or positional input
    Analog,
    /// DIP switch or other configuration input
    Dip,
}

/// Descriptor for one driver control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlInfo {
    /// Human-readable label, e.g. `"p1 fire 1"`
    pub label: String,
    pub kind: ControlKind,
}

impl ControlInfo {
    pub fn switch(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: ControlKind::Switch,
        }
    }
}

/// Handle to a settable control on the machine (the control's metadata index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlSlot(pub usize);

/// Result of advancing one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Frame emulated (and drawn, if requested)
    Completed,
    /// Frame emulated but the video path failed to produce an image
    PresentFailed,
}

/// Emulated machine driven by the scheduler
pub trait Machine {
    /// Native state format version, used when a snapshot carries no header.
    fn format_version(&self) -> u32;

    /// Advance exactly one frame.
    ///
    /// `render` requests a drawn frame; skipped frames are emulated without
    /// producing an image. When `sound` is present the machine writes this
    /// frame's audio into it.
    fn advance_frame(&mut self, render: bool, sound: Option<&mut [i16]>) -> FrameOutcome;

    /// Restore internal state by issuing area requests against `source`.
    ///
    /// `format_version` is the version of the data being read, which may
    /// differ from [`Machine::format_version`] when the snapshot header says so.
    fn restore_state(&mut self, source: &mut dyn StateSource, format_version: u32);

    /// Recompute caches derived from restored state (palette, etc.)
    fn recalc_palette(&mut self);

    /// Number of control metadata entries
    fn control_count(&self) -> usize;

    /// Describe the control at `index`, or `None` if the driver has no usable
    /// descriptor for it.
    fn control_info(&self, index: usize) -> Option<ControlInfo>;

    /// Write a switch value into a control slot.
    fn set_control(&mut self, slot: ControlSlot, pressed: bool);
}

/// Direction of an automatic state transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoState {
    Load,
    Save,
}

/// Host-side collaborators of the run loop
pub trait Frontend<M: Machine> {
    /// Poll live input devices and write their values into the machine.
    ///
    /// `advancing` is false while paused: devices are polled so that UI state
    /// stays current but the machine does not consume the input.
    fn poll_input(&mut self, machine: &mut M, advancing: bool);

    /// Present the most recent frame.
    fn present(&mut self, machine: &mut M);

    /// Silence the audio output after a failed video frame.
    fn blank_audio(&mut self) {}

    /// Load or save the automatic state slot (used when replay is disabled).
    fn auto_state(&mut self, _machine: &mut M, _direction: AutoState) -> anyhow::Result<()> {
        Ok(())
    }

    /// Externally signalled quit (window closed, quit key)
    fn should_quit(&mut self) -> bool {
        false
    }
}
