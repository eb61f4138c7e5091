//! Run command - replay a recording on a headless machine
//!
//! Time is simulated: the throttle clock advances one millisecond per host
//! iteration, so a run is as fast as the machine allows and its output is
//! reproducible.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

use arcade_replay_core::{
    Frontend, HeadlessMachine, Machine, ReplayRunner, RunConfig, RunStatus, TimingRegime, config,
};

use crate::machine_file;

/// Samples per audio buffer in the audio-driven regime
const AUDIO_BUFFER_SAMPLES: usize = 1470;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RegimeArg {
    /// Pace frames with the throttle clock
    Free,
    /// One frame per audio buffer
    Audio,
}

impl From<RegimeArg> for TimingRegime {
    fn from(regime: RegimeArg) -> Self {
        match regime {
            RegimeArg::Free => TimingRegime::FreeRunning,
            RegimeArg::Audio => TimingRegime::AudioDriven,
        }
    }
}

/// Arguments for the run command
#[derive(Args)]
pub struct RunArgs {
    /// Run configuration (arcade-replay.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Machine description (machine.toml)
    #[arg(short, long)]
    pub machine: Option<PathBuf>,

    /// Snapshot to start from (overrides the config file)
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Recorded input log (overrides the config file)
    #[arg(long)]
    pub inputs: Option<PathBuf>,

    /// Stop after this many emulated frames
    #[arg(long)]
    pub frames: Option<u64>,

    /// Pacing regime
    #[arg(long, value_enum, default_value = "free")]
    pub regime: RegimeArg,

    /// Render every due frame
    #[arg(long)]
    pub always_draw: bool,

    /// Fast-forward for the whole run
    #[arg(long)]
    pub fast: bool,

    /// Print the control values seen by every frame
    #[arg(long)]
    pub trace: bool,
}

/// Frontend with no devices and no display
#[derive(Debug, Default)]
struct HeadlessFrontend {
    presents: u64,
    audio_blanks: u64,
}

impl Frontend<HeadlessMachine> for HeadlessFrontend {
    fn poll_input(&mut self, _machine: &mut HeadlessMachine, _advancing: bool) {}

    fn present(&mut self, _machine: &mut HeadlessMachine) {
        self.presents += 1;
    }

    fn blank_audio(&mut self) {
        self.audio_blanks += 1;
    }
}

fn resolve_config(args: &RunArgs) -> Result<RunConfig> {
    let mut run_config = match &args.config {
        Some(path) => config::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => RunConfig::default(),
    };

    if let Some(state) = &args.state {
        run_config.replay.state_path = state.clone();
    }
    if let Some(inputs) = &args.inputs {
        run_config.replay.inputs_path = inputs.clone();
    }
    if args.always_draw {
        run_config.timing.always_draw_frames = true;
    }
    Ok(run_config)
}

/// Headless machine for the run; frames are only traced with `--trace`
fn build_machine(args: &RunArgs) -> Result<HeadlessMachine> {
    let machine = machine_file::load_or_default(args.machine.as_deref())?.build();
    Ok(if args.trace {
        machine.with_frame_trace()
    } else {
        machine
    })
}

/// Execute the run command
pub fn execute(args: RunArgs) -> Result<()> {
    let run_config = resolve_config(&args)?;
    if !run_config.replay.is_enabled() && args.frames.is_none() {
        anyhow::bail!("Nothing to stop the run: give --state and --inputs, or --frames");
    }

    let machine = build_machine(&args)?;
    let mut runner = ReplayRunner::new(
        machine,
        HeadlessFrontend::default(),
        &run_config,
        args.regime.into(),
    );

    // Load status is logged by the replay driver
    runner.init()?;
    tracing::info!(
        regime = ?args.regime,
        limit = ?args.frames,
        fast = args.fast,
        "Starting headless run"
    );
    runner.scheduler_mut().reset(0);
    runner.scheduler_mut().speed_mut().set_fast(args.fast);

    let limit = args.frames.unwrap_or(u64::MAX);
    let mut sound = vec![0i16; AUDIO_BUFFER_SAMPLES];
    let mut now_ms = 0u64;
    let status = loop {
        if runner.scheduler().counters().frames_emulated >= limit {
            if runner.replay().is_loaded() {
                tracing::warn!(
                    frames = limit,
                    "Frame limit reached before the replay finished"
                );
            }
            break RunStatus::QuitRequested;
        }
        now_ms += 1;
        if args.regime == RegimeArg::Audio {
            runner.audio_frame(true, &mut sound);
        }
        match runner.tick(now_ms) {
            RunStatus::Running => {}
            status => break status,
        }
    };
    runner.exit()?;

    let summary = runner.summary(status);
    let frontend = runner.frontend();
    println!();
    println!("=== Run Complete ===");
    println!("Stopped: {:?}", summary.status);
    println!("Frames emulated: {}", summary.counters.frames_emulated);
    println!("Frames rendered: {}", summary.counters.frames_rendered);
    println!("Presents: {}", frontend.presents);
    if frontend.audio_blanks > 0 {
        println!("Audio blanked: {}", frontend.audio_blanks);
    }

    if args.trace {
        print_trace(runner.machine());
    }
    Ok(())
}

fn print_trace(machine: &HeadlessMachine) {
    let labels: Vec<String> = (0..machine.control_count())
        .map(|index| {
            machine
                .control_info(index)
                .map(|info| info.label)
                .unwrap_or_else(|| format!("#{index}"))
        })
        .collect();

    println!();
    println!("frame  drawn  {}", labels.join(" | "));
    for (frame, trace) in machine.frames().iter().enumerate() {
        let values: Vec<String> = trace.controls.iter().map(u8::to_string).collect();
        println!(
            "{:>5}  {:<5}  {}",
            frame + 1,
            if trace.rendered { "yes" } else { "no" },
            values.join(" | ")
        );
    }
}
