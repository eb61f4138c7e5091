//! Frame pacing
//!
//! Decides how many frames the machine advances per host tick and which of
//! them are drawn. One of two regimes is chosen per run:
//!
//! ```text
//! AudioDriven   audio buffer wanted ──▶ audio_frame()  one frame per buffer
//! FreeRunning   host idle loop      ──▶ run_idle(now)  due frames from the clock
//!
//! per tick:
//!   paused, no step ─▶ poll (non-advancing) + present, nothing advances
//!   step pending    ─▶ due = 1, step consumed
//!   fast-forward    ─▶ fast_speed frames, not drawn
//!   due frames      ─▶ due - 1 not drawn, last one drawn
//!                      (all drawn with always_draw_frames)
//! ```
//!
//! Every advanced frame takes its input from the replay session when one is
//! configured, and from the frontend's live devices otherwise.
//!
//! Both entry points take `&mut self`: the scheduler has a single writer. A
//! host whose audio callback runs on another thread wraps it in a `Mutex`.

mod clock;
mod speed;
mod stats;

#[cfg(test)]
mod tests;

use std::time::{Duration, Instant};

pub use clock::{RECALC_INTERVAL, SchedulerClock};
pub use speed::SpeedControl;
pub use stats::{FPS_SAMPLE_FRAMES, FpsMeter, FrameCounters};

use crate::config::TimingConfig;
use crate::machine::{FrameOutcome, Frontend, Machine};
use crate::replay::ReplayDriver;

/// Which event paces emulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingRegime {
    /// The audio device requests buffers; each one is a frame
    AudioDriven,
    /// The host loop polls and the throttle clock decides
    FreeRunning,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Frames the clock said were due (after the catch-up cap)
    pub due: u32,
    /// Frames advanced, including fast-forward frames
    pub emulated: u32,
    /// Frames advanced with rendering
    pub rendered: u32,
    /// The tick presented a paused frame instead of advancing
    pub paused: bool,
}

/// Machine, frontend and replay session a tick operates on
pub struct FrameTargets<'a, M: Machine, F: Frontend<M>> {
    pub machine: &'a mut M,
    pub frontend: &'a mut F,
    pub replay: &'a mut ReplayDriver,
}

impl<'a, M: Machine, F: Frontend<M>> FrameTargets<'a, M, F> {
    pub fn new(machine: &'a mut M, frontend: &'a mut F, replay: &'a mut ReplayDriver) -> Self {
        Self {
            machine,
            frontend,
            replay,
        }
    }
}

/// Frame scheduler
#[derive(Debug)]
pub struct FrameScheduler {
    regime: TimingRegime,
    clock: SchedulerClock,
    speed: SpeedControl,
    counters: FrameCounters,
    fps: Option<FpsMeter>,
    always_draw_frames: bool,
    cpu_budget: Duration,
    epoch: Instant,
}

impl FrameScheduler {
    pub fn new(regime: TimingRegime, config: &TimingConfig) -> Self {
        Self {
            regime,
            clock: SchedulerClock::new(config.virtual_fps, config.max_catch_up),
            speed: SpeedControl::new(config.fast_speed),
            counters: FrameCounters::default(),
            fps: config.show_fps.then(FpsMeter::new),
            always_draw_frames: config.always_draw_frames,
            cpu_budget: config.cpu_budget(),
            epoch: Instant::now(),
        }
    }

    pub fn speed(&self) -> &SpeedControl {
        &self.speed
    }

    pub fn speed_mut(&mut self) -> &mut SpeedControl {
        &mut self.speed
    }

    pub fn counters(&self) -> FrameCounters {
        self.counters
    }

    /// Latest FPS reading, if the meter is enabled and has one
    pub fn fps(&self) -> Option<f64> {
        self.fps.as_ref().and_then(FpsMeter::fps)
    }

    pub fn set_always_draw_frames(&mut self, always_draw_frames: bool) {
        self.always_draw_frames = always_draw_frames;
    }

    /// Milliseconds since the scheduler was created
    pub fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Restart the throttle: no debt, reference time `now_ms`
    pub fn reset(&mut self, now_ms: u64) {
        self.clock.reset(now_ms);
    }

    pub fn reset_now(&mut self) {
        self.reset(self.now_ms());
    }

    /// Free-running tick at `now_ms`.
    ///
    /// Does nothing under [`TimingRegime::AudioDriven`], where the audio
    /// callback paces frames instead.
    pub fn run_idle<M: Machine, F: Frontend<M>>(
        &mut self,
        now_ms: u64,
        targets: &mut FrameTargets<'_, M, F>,
    ) -> TickReport {
        if self.regime == TimingRegime::AudioDriven {
            return TickReport::default();
        }

        let mut due = self.clock.advance(now_ms);
        if due == 0 {
            return TickReport::default();
        }

        let mut report = TickReport {
            due,
            ..TickReport::default()
        };

        if self.speed.is_paused() {
            if !self.speed.take_step() {
                self.present_paused(targets);
                report.paused = true;
                return report;
            }
            due = 1;
            report.due = 1;
        }

        self.run_fast_burst(targets, &mut report);

        if self.always_draw_frames {
            for _ in 0..due {
                self.run_frame(true, None, targets, &mut report);
            }
        } else {
            for _ in 1..due {
                self.run_frame(false, None, targets, &mut report);
            }
            self.run_frame(true, None, targets, &mut report);
        }

        tracing::trace!(due = report.due, emulated = report.emulated, "idle tick");
        report
    }

    /// Audio-driven tick: produce one frame into `sound`.
    ///
    /// `draw` is the host's request to render this frame. While paused the
    /// current frame is presented and `sound` is left untouched; a stepped
    /// frame is emulated but its buffer is overwritten with silence.
    pub fn audio_frame<M: Machine, F: Frontend<M>>(
        &mut self,
        draw: bool,
        sound: &mut [i16],
        targets: &mut FrameTargets<'_, M, F>,
    ) -> TickReport {
        if self.regime != TimingRegime::AudioDriven {
            tracing::debug!("audio callback ignored in free-running regime");
            return TickReport::default();
        }

        let mut report = TickReport {
            due: 1,
            ..TickReport::default()
        };

        if self.speed.is_paused() {
            if self.speed.take_step() {
                self.run_frame(draw, Some(&mut *sound), targets, &mut report);
                sound.fill(0);
            } else {
                self.present_paused(targets);
                report.paused = true;
            }
            return report;
        }

        self.run_fast_burst(targets, &mut report);
        self.run_frame(draw, Some(sound), targets, &mut report);
        report
    }

    fn run_fast_burst<M: Machine, F: Frontend<M>>(
        &mut self,
        targets: &mut FrameTargets<'_, M, F>,
        report: &mut TickReport,
    ) {
        if self.speed.is_fast() {
            for _ in 0..self.speed.fast_speed() {
                self.run_frame(false, None, targets, report);
            }
        }
    }

    fn present_paused<M: Machine, F: Frontend<M>>(&mut self, targets: &mut FrameTargets<'_, M, F>) {
        if !targets.replay.is_enabled() {
            targets.frontend.poll_input(targets.machine, false);
        }
        targets.frontend.present(targets.machine);
    }

    fn run_frame<M: Machine, F: Frontend<M>>(
        &mut self,
        render: bool,
        sound: Option<&mut [i16]>,
        targets: &mut FrameTargets<'_, M, F>,
        report: &mut TickReport,
    ) {
        let frame_start = Instant::now();

        self.counters.frames_emulated += 1;
        self.counters.current_frame += 1;
        report.emulated += 1;

        if targets.replay.is_enabled() {
            targets.replay.apply_frame(targets.machine);
        } else {
            targets.frontend.poll_input(targets.machine, true);
        }

        let outcome = targets.machine.advance_frame(render, sound);

        if render {
            self.counters.frames_rendered += 1;
            report.rendered += 1;
            if outcome == FrameOutcome::PresentFailed {
                tracing::warn!(
                    frame = self.counters.current_frame,
                    "Frame presentation failed, blanking audio"
                );
                targets.frontend.blank_audio();
            }
            targets.frontend.present(targets.machine);

            if let Some(meter) = &mut self.fps {
                meter.on_rendered(
                    self.counters.frames_rendered,
                    Instant::now(),
                    self.speed.speed_multiplier(),
                );
            }
        }

        let frame_time = frame_start.elapsed();
        if frame_time > self.cpu_budget {
            tracing::warn!(
                "Frame took {:?}, exceeds budget of {:?}",
                frame_time,
                self.cpu_budget
            );
        }
    }
}
