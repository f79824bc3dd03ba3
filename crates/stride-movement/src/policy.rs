//! Movement policy seam between the modifier and whatever integrates movement

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::owner::MovementOwner;

/// Kinematic state the policy reads from the integrator
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KinematicState {
    pub velocity: Vec3,
    pub grounded: bool,
}

impl KinematicState {
    /// Horizontal (X/Z) speed
    pub fn horizontal_speed(&self) -> f32 {
        Vec3::new(self.velocity.x, 0.0, self.velocity.z).length()
    }
}

/// Integrator defaults a policy falls back to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseMovement {
    /// Maximum acceleration in units/s²
    pub max_acceleration: f32,
    /// Deceleration applied while walking with no input, in units/s²
    pub braking_deceleration: f32,
    /// Ground friction coefficient
    pub ground_friction: f32,
}

impl Default for BaseMovement {
    fn default() -> Self {
        Self {
            max_acceleration: 2048.0,
            braking_deceleration: 2048.0,
            ground_friction: 8.0,
        }
    }
}

/// Speed, acceleration and friction decisions for one physics step
pub trait MovementPolicy {
    /// Maximum speed; `owner` is `None` when the owning character is missing
    fn max_speed(&self, owner: Option<&dyn MovementOwner>) -> f32;

    fn max_acceleration(&self, state: &KinematicState) -> f32;

    fn max_braking_deceleration(&self, state: &KinematicState) -> f32;

    /// Ground friction to use instead of the integrator default, if any
    fn friction_override(&self, state: &KinematicState) -> Option<f32>;
}
