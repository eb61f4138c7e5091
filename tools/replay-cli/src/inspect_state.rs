//! Inspect-state command - snapshot header and payload summary

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use arcade_replay_core::state;

use crate::machine_file;

/// Arguments for the inspect-state command
#[derive(Args)]
pub struct InspectStateArgs {
    /// Snapshot file
    pub state: PathBuf,

    /// Machine description to test-restore the snapshot against
    #[arg(short, long)]
    pub machine: Option<PathBuf>,
}

/// Execute the inspect-state command
pub fn execute(args: InspectStateArgs) -> Result<()> {
    let blob = std::fs::read(&args.state)
        .with_context(|| format!("Failed to read snapshot: {}", args.state.display()))?;

    let parsed = state::parse(&blob)
        .with_context(|| format!("Invalid snapshot: {}", args.state.display()))?;

    println!("Snapshot: {}", args.state.display());
    println!("Size: {} bytes", blob.len());
    match parsed.version {
        Some(version) => {
            println!("Header: {} bytes", parsed.header_len);
            println!("Version: {version:#010x}");
        }
        None => println!("Header: none"),
    }
    println!("Payload: {} bytes", parsed.payload.len());
    println!("Checksum: {:016x}", parsed.checksum());

    let Some(machine_path) = args.machine else {
        return Ok(());
    };
    let mut machine = machine_file::MachineFile::load(&machine_path)?.build();
    let report = state::restore(&mut machine, &blob).context("Test restore failed")?;

    println!();
    println!("=== Test Restore ===");
    println!("Version used: {:#010x}", report.version);
    println!("Consumed: {} bytes", report.consumed);
    if report.unread > 0 {
        println!("Unread: {} bytes", report.unread);
    }
    Ok(())
}
