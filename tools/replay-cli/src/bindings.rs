//! Bindings command - show which controls a recording drives

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use arcade_replay_core::{Machine, bindings};

use crate::machine_file::MachineFile;

/// Arguments for the bindings command
#[derive(Args)]
pub struct BindingsArgs {
    /// Machine description (machine.toml)
    pub machine: PathBuf,
}

/// Execute the bindings command
pub fn execute(args: BindingsArgs) -> Result<()> {
    let machine = MachineFile::load(&args.machine)?.build();
    let bound = bindings::build(&machine);

    println!("Controls: {}", machine.control_count());
    println!("Bindings: {}", bound.len());
    println!();
    for binding in &bound {
        let label = machine
            .control_info(binding.slot.0)
            .map(|info| info.label)
            .unwrap_or_default();
        println!(
            "  slot {:>3}  p{} bit {:>2}  {label}",
            binding.slot.0,
            binding.player + 1,
            binding.bit
        );
    }
    Ok(())
}
