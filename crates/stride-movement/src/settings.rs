//! Per-gait movement settings

use serde::{Deserialize, Serialize};

use crate::curve::SpeedCurve;
use crate::gait::Gait;

/// Per-gait speed table plus an optional response curve
///
/// Owned by the character controller and pushed into the movement modifier.
/// `walk_speed <= run_speed <= sprint_speed` is expected but not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementSettings {
    /// Walk speed in units per second
    pub walk_speed: f32,
    /// Run speed in units per second
    pub run_speed: f32,
    /// Sprint speed in units per second
    pub sprint_speed: f32,
    /// Acceleration (x), braking deceleration (y) and ground friction (z) by mapped speed
    pub movement_curve: Option<SpeedCurve>,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            walk_speed: 165.0,
            run_speed: 375.0,
            sprint_speed: 650.0,
            movement_curve: None,
        }
    }
}

impl MovementSettings {
    /// Speed table without a curve
    pub fn new(walk_speed: f32, run_speed: f32, sprint_speed: f32) -> Self {
        Self {
            walk_speed,
            run_speed,
            sprint_speed,
            movement_curve: None,
        }
    }

    /// Attach an acceleration, braking and friction curve
    pub fn with_curve(mut self, curve: SpeedCurve) -> Self {
        self.movement_curve = Some(curve);
        self
    }

    /// Speed cap for a gait
    pub fn speed_for_gait(&self, gait: Gait) -> f32 {
        match gait {
            Gait::Walking => self.walk_speed,
            Gait::Running => self.run_speed,
            Gait::Sprinting => self.sprint_speed,
        }
    }

    /// Map a horizontal speed onto 0..=3 (stopped, walk, run, sprint)
    pub fn mapped_speed(&self, speed: f32) -> f32 {
        if speed > self.run_speed {
            return map_range_clamped((self.run_speed, self.sprint_speed), (2.0, 3.0), speed);
        }
        if speed > self.walk_speed {
            return map_range_clamped((self.walk_speed, self.run_speed), (1.0, 2.0), speed);
        }
        map_range_clamped((0.0, self.walk_speed), (0.0, 1.0), speed)
    }
}

/// Linearly remap `value` from `input` to `output`, clamped to `output`
fn map_range_clamped(input: (f32, f32), output: (f32, f32), value: f32) -> f32 {
    let divisor = input.1 - input.0;
    let pct = if divisor == 0.0 {
        if value >= input.1 {
            1.0
        } else {
            0.0
        }
    } else {
        ((value - input.0) / divisor).clamp(0.0, 1.0)
    };
    output.0 + (output.1 - output.0) * pct
}
