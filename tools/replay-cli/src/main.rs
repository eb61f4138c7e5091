//! Arcade Replay CLI - inspect and run recorded replays
//!
//! # Commands
//!
//! - `arcade-replay inspect-state` - Show a snapshot's header and payload
//! - `arcade-replay inspect-log` - List recorded input masks
//! - `arcade-replay bindings` - Show which controls a recording drives
//! - `arcade-replay run` - Replay a recording on a headless machine
//!
//! # Usage
//!
//! ```bash
//! # Check a snapshot against a machine's state layout
//! arcade-replay inspect-state game.fs --machine machine.toml
//!
//! # Replay a recording and print the control values of every frame
//! arcade-replay run --machine machine.toml --state game.fs --inputs game.inp --trace
//! ```
//!
//! # Machine description (machine.toml)
//!
//! ```toml
//! state_areas = [16, 4096]
//!
//! [[controls]]
//! label = "p1 up"
//!
//! [[controls]]
//! label = "p1 dial"
//! kind = "analog"
//! ```

mod bindings;
mod inspect_log;
mod inspect_state;
mod machine_file;
mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Arcade Replay CLI - inspect and run recorded replays
#[derive(Parser)]
#[command(name = "arcade-replay")]
#[command(about = "Inspect and run arcade replay snapshots and input logs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a snapshot's header and payload summary
    InspectState(inspect_state::InspectStateArgs),

    /// List the records of an input log
    InspectLog(inspect_log::InspectLogArgs),

    /// Show the input bindings built for a machine description
    Bindings(bindings::BindingsArgs),

    /// Replay a recording on a headless machine
    Run(run::RunArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::InspectState(args) => inspect_state::execute(args),
        Commands::InspectLog(args) => inspect_log::execute(args),
        Commands::Bindings(args) => bindings::execute(args),
        Commands::Run(args) => run::execute(args),
    }
}
