//! Headless machine for tooling and tests
//!
//! A [`Machine`] with a declared state layout and control table but no
//! emulation behind it. Restores read each area in order and control writes are
//! kept per slot. With [`HeadlessMachine::with_frame_trace`] every advanced
//! frame also records the control values it saw.
//! The CLI's `run` command and the test suites drive replays through it.

use crate::machine::{ControlInfo, ControlSlot, FrameOutcome, Machine, StateSource};

/// Format version reported when a snapshot carries no header
pub const HEADLESS_FORMAT_VERSION: u32 = 0x0001_0000;

/// One frame as observed by the headless machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTrace {
    pub rendered: bool,
    /// Control values at the moment the frame ran, indexed by slot
    pub controls: Vec<u8>,
}

/// Scriptable stand-in for an emulated machine
#[derive(Debug, Clone, Default)]
pub struct HeadlessMachine {
    area_sizes: Vec<usize>,
    areas: Vec<Vec<u8>>,
    controls: Vec<Option<ControlInfo>>,
    values: Vec<u8>,
    frames: Vec<FrameTrace>,
    trace_frames: bool,
    frames_advanced: usize,
    frames_rendered: usize,
    palette_recalcs: u32,
    last_restore_version: Option<u32>,
    areas_restored: usize,
    fail_presentation: bool,
}

impl HeadlessMachine {
    /// Machine whose state scan requests areas of the given sizes, in order
    pub fn new(area_sizes: &[usize]) -> Self {
        Self {
            area_sizes: area_sizes.to_vec(),
            areas: area_sizes.iter().map(|&len| vec![0u8; len]).collect(),
            ..Self::default()
        }
    }

    pub fn with_control(mut self, info: ControlInfo) -> Self {
        self.controls.push(Some(info));
        self.values.push(0);
        self
    }

    /// Add a control slot the driver cannot describe
    pub fn with_undescribed_control(mut self) -> Self {
        self.controls.push(None);
        self.values.push(0);
        self
    }

    /// Keep a [`FrameTrace`] for every advanced frame
    pub fn with_frame_trace(mut self) -> Self {
        self.trace_frames = true;
        self
    }

    /// Report every rendered frame as a failed presentation
    pub fn with_failing_presentation(mut self) -> Self {
        self.fail_presentation = true;
        self
    }

    /// Total bytes the state scan asks for
    pub fn state_size(&self) -> usize {
        self.area_sizes.iter().sum()
    }

    /// Restored state, all areas concatenated
    pub fn state_bytes(&self) -> Vec<u8> {
        self.areas.concat()
    }

    pub fn control_value(&self, slot: ControlSlot) -> Option<u8> {
        self.values.get(slot.0).copied()
    }

    /// Traced frames; empty unless built with [`Self::with_frame_trace`]
    pub fn frames(&self) -> &[FrameTrace] {
        &self.frames
    }

    /// Frames advanced so far
    pub fn frame_count(&self) -> usize {
        self.frames_advanced
    }

    pub fn frames_rendered(&self) -> usize {
        self.frames_rendered
    }

    pub fn palette_recalcs(&self) -> u32 {
        self.palette_recalcs
    }

    pub fn last_restore_version(&self) -> Option<u32> {
        self.last_restore_version
    }

    /// Areas requested by the last restore
    pub fn areas_restored(&self) -> usize {
        self.areas_restored
    }
}

impl Machine for HeadlessMachine {
    fn format_version(&self) -> u32 {
        HEADLESS_FORMAT_VERSION
    }

    fn advance_frame(&mut self, render: bool, sound: Option<&mut [i16]>) -> FrameOutcome {
        if let Some(sound) = sound {
            // Deterministic non-silent signal so silencing is observable
            let frame = self.frames_advanced as i16;
            sound.fill(frame.wrapping_add(1));
        }
        self.frames_advanced += 1;
        if render {
            self.frames_rendered += 1;
        }
        if self.trace_frames {
            self.frames.push(FrameTrace {
                rendered: render,
                controls: self.values.clone(),
            });
        }
        if render && self.fail_presentation {
            FrameOutcome::PresentFailed
        } else {
            FrameOutcome::Completed
        }
    }

    fn restore_state(&mut self, source: &mut dyn StateSource, format_version: u32) {
        self.last_restore_version = Some(format_version);
        self.areas_restored = 0;
        for area in &mut self.areas {
            source.fill(area);
            self.areas_restored += 1;
        }
    }

    fn recalc_palette(&mut self) {
        self.palette_recalcs += 1;
    }

    fn control_count(&self) -> usize {
        self.controls.len()
    }

    fn control_info(&self, index: usize) -> Option<ControlInfo> {
        self.controls.get(index).cloned().flatten()
    }

    fn set_control(&mut self, slot: ControlSlot, pressed: bool) {
        if let Some(value) = self.values.get_mut(slot.0) {
            *value = u8::from(pressed);
        }
    }
}
