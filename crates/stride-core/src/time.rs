//! Simulation time for Stride
//!
//! Tracks delta time, fixed movement ticks and the global time dilation that the
//! debug overlay toggles for slow motion.

use serde::{Deserialize, Serialize};

/// Dilation used while slow motion is active.
pub const SLOMO_DILATION: f32 = 0.15;

/// Configuration for simulation time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Global time dilation (1.0 = real time)
    pub time_dilation: f32,
    /// Fixed timestep for movement ticks (in seconds)
    pub fixed_timestep: f32,
    /// Maximum delta time to prevent spiral of death
    pub max_delta_time: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_dilation: 1.0,
            fixed_timestep: 1.0 / 60.0,
            max_delta_time: 0.25,
        }
    }
}

/// Simulation time tracking
#[derive(Debug, Clone, Default)]
pub struct GameTime {
    /// Configuration
    pub config: TimeConfig,
    /// Dilated time since start in seconds
    pub total_time: f64,
    /// Dilated delta time for this frame (clamped)
    pub delta_time: f32,
    /// Undilated delta time
    pub real_delta_time: f32,
    /// Frame counter
    pub frame_count: u64,
    fixed_accumulator: f32,
}

impl GameTime {
    /// Create a new game time with custom config
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Advance by the raw delta of the previous frame
    pub fn update(&mut self, raw_delta: f32) {
        self.real_delta_time = raw_delta.min(self.config.max_delta_time);
        self.frame_count += 1;
        self.delta_time = self.real_delta_time * self.config.time_dilation;
        self.total_time += self.delta_time as f64;
        self.fixed_accumulator += self.delta_time;
    }

    /// Number of fixed movement ticks to run this frame
    pub fn fixed_steps(&mut self) -> u32 {
        let mut steps = 0;
        while self.fixed_accumulator >= self.config.fixed_timestep {
            self.fixed_accumulator -= self.config.fixed_timestep;
            steps += 1;
        }
        steps
    }

    /// Current global time dilation
    pub fn time_dilation(&self) -> f32 {
        self.config.time_dilation
    }

    /// Set the global time dilation (0.0 = frozen, 1.0 = real time)
    pub fn set_time_dilation(&mut self, dilation: f32) {
        self.config.time_dilation = dilation.max(0.0);
    }
}
