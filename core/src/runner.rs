//! Run loop orchestration
//!
//! The [`ReplayRunner`] owns a machine, its frontend, the replay session and
//! the frame scheduler, and sequences them through a run:
//!
//! 1. `init` restarts the throttle and loads the replay (or the automatic
//!    save slot when replay is off)
//! 2. `tick` once per host loop iteration, until quit or replay end
//! 3. `exit` writes the automatic save slot when replay is off

use anyhow::{Context, Result};

use crate::config::RunConfig;
use crate::machine::{AutoState, Frontend, Machine};
use crate::replay::{LoadSummary, ReplayDriver};
use crate::scheduler::{FrameCounters, FrameScheduler, FrameTargets, TickReport, TimingRegime};

/// Why a run stopped, or that it should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    /// The frontend asked to quit
    QuitRequested,
    /// The replay log was exhausted
    ReplayFinished,
}

/// Totals reported when a run ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub status: RunStatus,
    pub counters: FrameCounters,
}

/// Drives one machine through a complete run
pub struct ReplayRunner<M: Machine, F: Frontend<M>> {
    machine: M,
    frontend: F,
    replay: ReplayDriver,
    scheduler: FrameScheduler,
}

impl<M: Machine, F: Frontend<M>> ReplayRunner<M, F> {
    pub fn new(machine: M, frontend: F, config: &RunConfig, regime: TimingRegime) -> Self {
        Self {
            machine,
            frontend,
            replay: ReplayDriver::new(config.replay.clone()),
            scheduler: FrameScheduler::new(regime, &config.timing),
        }
    }

    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn replay(&self) -> &ReplayDriver {
        &self.replay
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut FrameScheduler {
        &mut self.scheduler
    }

    /// Prepare the machine for the first frame.
    ///
    /// # Errors
    ///
    /// A configured replay that fails to load is fatal: the run must not
    /// continue on live input.
    pub fn init(&mut self) -> Result<Option<LoadSummary>> {
        self.scheduler.reset_now();

        let summary = self
            .replay
            .initialize(&mut self.machine)
            .context("Failed to start replay")?;

        if !self.replay.is_enabled()
            && let Err(err) = self.frontend.auto_state(&mut self.machine, AutoState::Load)
        {
            tracing::warn!("Automatic state not loaded: {err:#}");
        }

        Ok(summary)
    }

    /// One host loop iteration at `now_ms` on the scheduler's clock
    pub fn tick(&mut self, now_ms: u64) -> RunStatus {
        if self.frontend.should_quit() {
            return RunStatus::QuitRequested;
        }

        let mut targets = FrameTargets::new(&mut self.machine, &mut self.frontend, &mut self.replay);
        self.scheduler.run_idle(now_ms, &mut targets);

        if self.replay.is_finished() {
            RunStatus::ReplayFinished
        } else {
            RunStatus::Running
        }
    }

    /// Audio-driven regime entry point, called for each audio buffer
    pub fn audio_frame(&mut self, draw: bool, sound: &mut [i16]) -> TickReport {
        let mut targets = FrameTargets::new(&mut self.machine, &mut self.frontend, &mut self.replay);
        self.scheduler.audio_frame(draw, sound, &mut targets)
    }

    /// Tick on the wall clock until the run stops
    pub fn run(&mut self) -> RunSummary {
        loop {
            let now = self.scheduler.now_ms();
            match self.tick(now) {
                RunStatus::Running => std::thread::yield_now(),
                status => return self.summary(status),
            }
        }
    }

    pub fn summary(&self, status: RunStatus) -> RunSummary {
        RunSummary {
            status,
            counters: self.scheduler.counters(),
        }
    }

    /// Finish the run.
    ///
    /// # Errors
    ///
    /// Returns an error if the automatic save slot cannot be written.
    pub fn exit(&mut self) -> Result<()> {
        if self.replay.is_enabled() {
            return Ok(());
        }
        self.frontend
            .auto_state(&mut self.machine, AutoState::Save)
            .context("Failed to save automatic state")
    }
}
