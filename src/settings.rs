//! Simulation harness settings
//!
//! Loaded from the path given on the command line, otherwise from
//! `~/.config/stride/sim.toml`, falling back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stride_core::{load_toml, ConfigError, TimeConfig};
use stride_movement::{Gait, MovementSettings};
use tracing::{info, warn};

/// Everything the harness needs to run one simulated session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    pub run: RunSettings,
    pub time: TimeConfig,
    pub movement: MovementSettings,
    pub net: NetSettings,
    pub debug: DebugSettings,
    /// Actions applied to the predicting client at given ticks
    pub script: Vec<ScriptEvent>,
}

impl SimSettings {
    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("stride").join("sim.toml"))
    }

    /// Load from `path`, or the default location when none is given
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let Some(path) = Self::default_path() else {
                    warn!("Could not determine config directory");
                    return Self::with_demo_script();
                };
                if !path.exists() {
                    info!("No simulation settings found, using defaults");
                    return Self::with_demo_script();
                }
                path
            }
        };

        match Self::load_from(&path) {
            Ok(settings) => {
                info!("Loaded simulation settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!("{}, using defaults", e);
                Self::with_demo_script()
            }
        }
    }

    /// Load from `path`, failing on a missing or malformed file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        load_toml(path)
    }

    /// Defaults plus a short script exercising sprint, ADS, gait caps and a stun
    pub fn with_demo_script() -> Self {
        use ScriptAction::*;
        let event = |tick, action| ScriptEvent { tick, action };
        Self {
            script: vec![
                event(20, SetGait(Gait::Running)),
                event(60, StartSprinting),
                event(110, Stun { ticks: 12 }),
                event(160, StopSprinting),
                event(180, StartAimDownSights),
                event(230, StopAimDownSights),
                event(240, SetGait(Gait::Sprinting)),
                event(250, StartSprinting),
            ],
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Rendered frames to simulate
    pub frames: u32,
    /// Real seconds per frame
    pub frame_time: f32,
    /// Run without a remote authority, allowing time dilation
    pub standalone: bool,
    /// Frame at which slow motion is toggled, if any
    pub slomo_frame: Option<u32>,
    /// Movement input direction, normalized by the harness
    pub input: [f32; 3],
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            frames: 300,
            frame_time: 1.0 / 60.0,
            standalone: true,
            slomo_frame: Some(200),
            input: [1.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetSettings {
    /// Ticks a message spends in flight each way
    pub latency_ticks: u32,
    /// Longest combined move the client may send
    pub max_move_delta_time: f32,
    pub max_saved_moves: usize,
    /// Squared distance the authority tolerates before correcting
    pub max_position_error_squared: f32,
    /// Move speed reported by the character's attributes
    pub owner_move_speed: f32,
}

impl Default for NetSettings {
    fn default() -> Self {
        Self {
            latency_ticks: 3,
            max_move_delta_time: 0.125,
            max_saved_moves: 96,
            max_position_error_squared: 3.0,
            owner_move_speed: 600.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugSettings {
    /// Compile-time default is used when unset
    pub enabled: Option<bool>,
    pub show_traces: bool,
    pub show_debug_shapes: bool,
    pub show_layer_colors: bool,
    pub debug_view: bool,
    /// Show the debug mesh instead of the character's own
    pub debug_mesh: bool,
    /// Distance of the forward capsule sweep
    pub lookahead_distance: f32,
    /// Place a wall this far along the input direction
    pub wall_distance: Option<f32>,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            enabled: None,
            show_traces: true,
            show_debug_shapes: true,
            show_layer_colors: false,
            debug_view: false,
            debug_mesh: false,
            lookahead_distance: 300.0,
            wall_distance: Some(4000.0),
        }
    }
}

/// An action applied to the predicting client at a simulation tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub tick: u32,
    pub action: ScriptAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptAction {
    StartSprinting,
    StopSprinting,
    StartAimDownSights,
    StopAimDownSights,
    SetGait(Gait),
    /// Stun the character on the authority only, forcing a correction
    Stun { ticks: u32 },
}
