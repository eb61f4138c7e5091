//! Inspect-log command - list recorded input masks

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use arcade_replay_core::{InputLog, InputRecord};

/// Arguments for the inspect-log command
#[derive(Args)]
pub struct InspectLogArgs {
    /// Input log file
    pub inputs: PathBuf,

    /// Only print the first N records
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Skip records where no player holds any input
    #[arg(long)]
    pub skip_idle: bool,
}

/// Execute the inspect-log command
pub fn execute(args: InspectLogArgs) -> Result<()> {
    let data = std::fs::read(&args.inputs)
        .with_context(|| format!("Failed to read input log: {}", args.inputs.display()))?;
    let log = InputLog::new(data)
        .with_context(|| format!("Invalid input log: {}", args.inputs.display()))?;

    println!("Input log: {}", args.inputs.display());
    println!("Frames: {}", log.frame_count());
    println!();

    let limit = args.limit.unwrap_or(usize::MAX);
    for (frame, record) in log.records().enumerate().take(limit) {
        if args.skip_idle && is_idle(&record) {
            continue;
        }
        println!("{frame:>8}  p1 {:04x}  p2 {:04x}", record.masks[0], record.masks[1]);
    }
    Ok(())
}

fn is_idle(record: &InputRecord) -> bool {
    record.masks.iter().all(|&mask| mask == 0)
}
