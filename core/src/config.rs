//! Run configuration (`arcade-replay.toml`)
//!
//! Settings are stored in TOML. Every field has a default, so an empty file
//! (or no file at all) gives a normal 60 Hz run without replay.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunConfig {
    /// Frame pacing settings
    #[serde(default)]
    pub timing: TimingConfig,
    /// Replay input files
    #[serde(default)]
    pub replay: ReplayConfig,
}

/// Frame pacing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Target frame rate in hundredths of Hz (default: 6000, i.e. 60.00 Hz)
    #[serde(default = "default_virtual_fps")]
    pub virtual_fps: u32,
    /// Extra frames run per tick while fast-forwarding (default: 6)
    #[serde(default = "default_fast_speed")]
    pub fast_speed: u32,
    /// Render every due frame instead of skipping to the last (default: false)
    #[serde(default)]
    pub always_draw_frames: bool,
    /// Maintain the FPS meter (default: false)
    #[serde(default)]
    pub show_fps: bool,
    /// Upper bound on frames run by one tick after a stall (default: 100)
    #[serde(default = "default_max_catch_up")]
    pub max_catch_up: u32,
    /// Per-frame time after which a warning is logged, in microseconds (default: 4000)
    #[serde(default = "default_cpu_budget_us")]
    pub cpu_budget_us: u64,
}

/// Replay file configuration.
///
/// Replay is enabled only when both paths are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReplayConfig {
    /// Machine snapshot to start from
    #[serde(default)]
    pub state_path: PathBuf,
    /// Recorded per-frame input log
    #[serde(default)]
    pub inputs_path: PathBuf,
}

fn default_virtual_fps() -> u32 {
    6000
}
fn default_fast_speed() -> u32 {
    6
}
fn default_max_catch_up() -> u32 {
    100
}
fn default_cpu_budget_us() -> u64 {
    4000
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            virtual_fps: default_virtual_fps(),
            fast_speed: default_fast_speed(),
            always_draw_frames: false,
            show_fps: false,
            max_catch_up: default_max_catch_up(),
            cpu_budget_us: default_cpu_budget_us(),
        }
    }
}

impl TimingConfig {
    pub fn cpu_budget(&self) -> Duration {
        Duration::from_micros(self.cpu_budget_us)
    }
}

impl ReplayConfig {
    pub fn new(state_path: impl Into<PathBuf>, inputs_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            inputs_path: inputs_path.into(),
        }
    }

    pub fn has_state_path(&self) -> bool {
        !self.state_path.as_os_str().is_empty()
    }

    pub fn has_inputs_path(&self) -> bool {
        !self.inputs_path.as_os_str().is_empty()
    }

    /// Replay runs iff both files are configured
    pub fn is_enabled(&self) -> bool {
        self.has_state_path() && self.has_inputs_path()
    }
}

impl RunConfig {
    /// Check values that would make the scheduler meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.virtual_fps == 0 {
            return Err(ConfigError::Invalid {
                field: "timing.virtual_fps",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.timing.max_catch_up == 0 {
            return Err(ConfigError::Invalid {
                field: "timing.max_catch_up",
                reason: "must allow at least one frame per tick".to_string(),
            });
        }
        Ok(())
    }
}

/// Parse and validate configuration text
pub fn from_str(content: &str) -> Result<RunConfig, ConfigError> {
    let config: RunConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or holds
/// values the scheduler cannot run with.
pub fn load(path: &Path) -> Result<RunConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    from_str(&content)
}
