//! Frame scheduler tests

use crate::config::{ReplayConfig, TimingConfig};
use crate::headless::HeadlessMachine;
use crate::input_log::InputRecord;
use crate::machine::{ControlInfo, ControlSlot, Frontend, Machine};
use crate::replay::{ReplayDriver, ReplayState};

use super::{FrameScheduler, FrameTargets, TickReport, TimingRegime};

/// Frontend that records every call it receives
#[derive(Debug, Default)]
struct RecordingFrontend {
    /// `advancing` flag of each poll
    polls: Vec<bool>,
    presents: u32,
    blanks: u32,
}

impl<M: Machine> Frontend<M> for RecordingFrontend {
    fn poll_input(&mut self, _machine: &mut M, advancing: bool) {
        self.polls.push(advancing);
    }

    fn present(&mut self, _machine: &mut M) {
        self.presents += 1;
    }

    fn blank_audio(&mut self) {
        self.blanks += 1;
    }
}

struct Harness {
    machine: HeadlessMachine,
    frontend: RecordingFrontend,
    replay: ReplayDriver,
}

impl Harness {
    fn new() -> Self {
        Self {
            machine: HeadlessMachine::new(&[4]).with_frame_trace(),
            frontend: RecordingFrontend::default(),
            replay: ReplayDriver::disabled(),
        }
    }

    fn idle(&mut self, scheduler: &mut FrameScheduler, now_ms: u64) -> TickReport {
        let mut targets = FrameTargets::new(&mut self.machine, &mut self.frontend, &mut self.replay);
        scheduler.run_idle(now_ms, &mut targets)
    }

    fn audio(&mut self, scheduler: &mut FrameScheduler, draw: bool, sound: &mut [i16]) -> TickReport {
        let mut targets = FrameTargets::new(&mut self.machine, &mut self.frontend, &mut self.replay);
        scheduler.audio_frame(draw, sound, &mut targets)
    }

    fn rendered_pattern(&self) -> Vec<bool> {
        self.machine.frames().iter().map(|f| f.rendered).collect()
    }
}

fn free_running() -> FrameScheduler {
    let mut scheduler = FrameScheduler::new(TimingRegime::FreeRunning, &TimingConfig::default());
    scheduler.reset(0);
    scheduler
}

fn audio_driven() -> FrameScheduler {
    FrameScheduler::new(TimingRegime::AudioDriven, &TimingConfig::default())
}

// ============================================================================
// Free-Running Tests
// ============================================================================

#[test]
fn test_idle_before_first_interval_does_nothing() {
    let mut h = Harness::new();
    let mut scheduler = free_running();

    assert_eq!(h.idle(&mut scheduler, 10), TickReport::default());
    assert!(h.machine.frames().is_empty());
    assert_eq!(h.frontend.presents, 0);
}

#[test]
fn test_single_due_frame_is_rendered() {
    let mut h = Harness::new();
    let mut scheduler = free_running();

    let report = h.idle(&mut scheduler, 17);

    assert_eq!(report.due, 1);
    assert_eq!(report.rendered, 1);
    assert_eq!(h.rendered_pattern(), vec![true]);
    assert_eq!(h.frontend.polls, vec![true]);
    assert_eq!(h.frontend.presents, 1);
}

#[test]
fn test_catch_up_renders_only_last_frame() {
    let mut h = Harness::new();
    let mut scheduler = free_running();

    // 50 ms at 60 Hz: three frames due
    let report = h.idle(&mut scheduler, 50);

    assert_eq!(report.due, 3);
    assert_eq!(report.emulated, 3);
    assert_eq!(h.rendered_pattern(), vec![false, false, true]);
    assert_eq!(h.frontend.presents, 1);
    assert_eq!(scheduler.counters().frames_emulated, 3);
    assert_eq!(scheduler.counters().current_frame, 3);
    assert_eq!(scheduler.counters().frames_rendered, 1);
}

#[test]
fn test_always_draw_renders_every_frame() {
    let mut h = Harness::new();
    let config = TimingConfig {
        always_draw_frames: true,
        ..TimingConfig::default()
    };
    let mut scheduler = FrameScheduler::new(TimingRegime::FreeRunning, &config);
    scheduler.reset(0);

    h.idle(&mut scheduler, 50);

    assert_eq!(h.rendered_pattern(), vec![true, true, true]);
    assert_eq!(h.frontend.presents, 3);
}

#[test]
fn test_long_stall_capped() {
    let mut h = Harness::new();
    let mut scheduler = free_running();

    let report = h.idle(&mut scheduler, 60_000);

    assert_eq!(report.due, 100);
    assert_eq!(h.machine.frame_count(), 100);
    assert_eq!(h.machine.frames_rendered(), 1);
}

#[test]
fn test_audio_driven_idle_is_noop() {
    let mut h = Harness::new();
    let mut scheduler = audio_driven();
    scheduler.reset(0);

    assert_eq!(h.idle(&mut scheduler, 10_000), TickReport::default());
    assert!(h.machine.frames().is_empty());
}

#[test]
fn test_reset_restarts_throttle() {
    let mut h = Harness::new();
    let mut scheduler = free_running();

    scheduler.reset(5_000);
    assert_eq!(h.idle(&mut scheduler, 5_010).due, 0);
    assert_eq!(h.idle(&mut scheduler, 5_017).due, 1);
}

// ============================================================================
// Speed Policy Tests
// ============================================================================

#[test]
fn test_paused_presents_without_advancing() {
    let mut h = Harness::new();
    let mut scheduler = free_running();
    scheduler.speed_mut().set_paused(true);

    let report = h.idle(&mut scheduler, 50);

    assert!(report.paused);
    assert_eq!(report.emulated, 0);
    assert!(h.machine.frames().is_empty());
    assert_eq!(h.frontend.presents, 1);
    // Live input is still polled, but not consumed
    assert_eq!(h.frontend.polls, vec![false]);
    assert_eq!(scheduler.counters().frames_emulated, 0);
}

#[test]
fn test_step_runs_exactly_one_frame() {
    let mut h = Harness::new();
    let mut scheduler = free_running();
    scheduler.speed_mut().set_paused(true);
    scheduler.speed_mut().request_step();

    // Many frames due, but stepping forces one
    let report = h.idle(&mut scheduler, 500);

    assert_eq!(report.due, 1);
    assert_eq!(h.rendered_pattern(), vec![true]);
    assert!(!scheduler.speed().step_requested());

    // The step was consumed: the next tick is paused again
    let report = h.idle(&mut scheduler, 1_000);
    assert!(report.paused);
    assert_eq!(h.machine.frames().len(), 1);
}

#[test]
fn test_fast_forward_burst_precedes_due_frames() {
    let mut h = Harness::new();
    let mut scheduler = free_running();
    scheduler.speed_mut().set_fast(true);

    let report = h.idle(&mut scheduler, 34);

    // Six fast frames, then one skipped and one rendered due frame
    assert_eq!(report.due, 2);
    assert_eq!(report.emulated, 8);
    assert_eq!(
        h.rendered_pattern(),
        vec![false, false, false, false, false, false, false, true]
    );
}

#[test]
fn test_paused_replay_does_not_poll_live_input() {
    let mut h = Harness::new();
    h.replay = ReplayDriver::new(ReplayConfig::new("a.fs", "a.inp"));
    let mut scheduler = free_running();
    scheduler.speed_mut().set_paused(true);

    h.idle(&mut scheduler, 50);

    assert!(h.frontend.polls.is_empty());
    assert_eq!(h.frontend.presents, 1);
}

// ============================================================================
// Frame Execution Tests
// ============================================================================

#[test]
fn test_replay_replaces_live_input() {
    let mut h = Harness::new();
    h.machine = HeadlessMachine::new(&[4])
        .with_control(ControlInfo::switch("p1 start"))
        .with_frame_trace();
    h.replay = ReplayDriver::new(ReplayConfig::new("a.fs", "a.inp"));
    let inputs: Vec<u8> = [(0x0002, 0), (0, 0)]
        .iter()
        .flat_map(|&(a, b)| InputRecord::new(a, b).encode())
        .collect();
    h.replay
        .load_from_bytes(&mut h.machine, &[0u8; 4], inputs)
        .unwrap();

    let mut scheduler = free_running();
    scheduler.set_always_draw_frames(true);
    h.idle(&mut scheduler, 50);

    assert!(h.frontend.polls.is_empty());
    let seen: Vec<u8> = h.machine.frames().iter().map(|f| f.controls[0]).collect();
    assert_eq!(seen, vec![1, 0, 0]);
    assert_eq!(h.replay.state(), ReplayState::Finished);
    assert_eq!(h.machine.control_value(ControlSlot(0)), Some(0));
}

#[test]
fn test_failed_presentation_blanks_audio() {
    let mut h = Harness::new();
    h.machine = HeadlessMachine::new(&[4]).with_failing_presentation();
    let mut scheduler = free_running();

    h.idle(&mut scheduler, 50);

    // Only the rendered frame can fail presentation
    assert_eq!(h.frontend.blanks, 1);
    assert_eq!(h.frontend.presents, 1);
}

#[test]
fn test_fps_meter_disabled_by_default() {
    let mut h = Harness::new();
    let mut scheduler = free_running();
    for tick in 1..=100u64 {
        h.idle(&mut scheduler, tick * 17);
    }
    assert_eq!(scheduler.fps(), None);
}

// ============================================================================
// Audio-Driven Tests
// ============================================================================

#[test]
fn test_audio_frame_fills_buffer() {
    let mut h = Harness::new();
    let mut scheduler = audio_driven();
    let mut sound = [0i16; 8];

    let report = h.audio(&mut scheduler, true, &mut sound);

    assert_eq!(report.emulated, 1);
    assert_eq!(report.rendered, 1);
    assert!(sound.iter().all(|&s| s == 1));
}

#[test]
fn test_audio_paused_leaves_buffer() {
    let mut h = Harness::new();
    let mut scheduler = audio_driven();
    scheduler.speed_mut().set_paused(true);
    let mut sound = [7i16; 8];

    let report = h.audio(&mut scheduler, true, &mut sound);

    assert!(report.paused);
    assert!(h.machine.frames().is_empty());
    assert_eq!(h.frontend.presents, 1);
    assert_eq!(sound, [7i16; 8]);
}

#[test]
fn test_audio_step_writes_silence() {
    let mut h = Harness::new();
    let mut scheduler = audio_driven();
    scheduler.speed_mut().set_paused(true);
    scheduler.speed_mut().request_step();
    let mut sound = [0i16; 8];

    let report = h.audio(&mut scheduler, true, &mut sound);

    assert_eq!(report.emulated, 1);
    assert_eq!(h.machine.frames().len(), 1);
    assert_eq!(sound, [0i16; 8]);
    assert!(!scheduler.speed().step_requested());
}

#[test]
fn test_audio_fast_forward_burst() {
    let mut h = Harness::new();
    let mut scheduler = audio_driven();
    scheduler.speed_mut().set_fast(true);
    let mut sound = [0i16; 4];

    let report = h.audio(&mut scheduler, false, &mut sound);

    assert_eq!(report.emulated, 7);
    assert_eq!(report.rendered, 0);
    // The callback frame is the seventh advanced
    assert!(sound.iter().all(|&s| s == 7));
}

#[test]
fn test_audio_callback_ignored_when_free_running() {
    let mut h = Harness::new();
    let mut scheduler = free_running();
    let mut sound = [3i16; 4];

    assert_eq!(h.audio(&mut scheduler, true, &mut sound), TickReport::default());
    assert_eq!(sound, [3i16; 4]);
}
