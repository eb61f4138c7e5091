//! Machine description files for the headless machine

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use arcade_replay_core::{ControlInfo, ControlKind, HeadlessMachine};

/// State layout and control table of a machine (`machine.toml`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MachineFile {
    /// Sizes of the state areas, in scan order
    #[serde(default)]
    pub state_areas: Vec<usize>,
    /// Controls in metadata order
    #[serde(default)]
    pub controls: Vec<ControlEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ControlEntry {
    pub label: String,
    #[serde(default)]
    pub kind: ControlKindName,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKindName {
    #[default]
    Switch,
    Analog,
    Dip,
}

impl From<ControlKindName> for ControlKind {
    fn from(kind: ControlKindName) -> Self {
        match kind {
            ControlKindName::Switch => ControlKind::Switch,
            ControlKindName::Analog => ControlKind::Analog,
            ControlKindName::Dip => ControlKind::Dip,
        }
    }
}

impl MachineFile {
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid machine description")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read machine description: {}", path.display()))?;
        Self::from_str(&content).with_context(|| format!("In {}", path.display()))
    }

    /// Headless machine with this layout and control table
    pub fn build(&self) -> HeadlessMachine {
        self.controls
            .iter()
            .fold(HeadlessMachine::new(&self.state_areas), |machine, entry| {
                machine.with_control(ControlInfo {
                    label: entry.label.clone(),
                    kind: entry.kind.into(),
                })
            })
    }
}

/// Load a description, or an empty machine when none is given
pub fn load_or_default(path: Option<&Path>) -> Result<MachineFile> {
    path.map_or_else(|| Ok(MachineFile::default()), MachineFile::load)
}
