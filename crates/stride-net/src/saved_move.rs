//! Per-tick move snapshots

use glam::Vec3;
use serde::{Deserialize, Serialize};
use stride_movement::{CompressedFlags, MovementIntent, MovementModifier};

/// Minimum dot between normalized inputs for two moves to combine
const INPUT_DOT_THRESHOLD_COMBINE: f32 = 0.996;
/// Maximum input magnitude difference for two moves to combine
const INPUT_MAG_THRESHOLD_COMBINE: f32 = 0.01;

/// Base-framework fields of a move
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveInput {
    /// Client time the move was made at
    pub timestamp: f32,
    pub delta_time: f32,
    /// Desired move direction, length up to 1
    pub input: Vec3,
    pub jump_pressed: bool,
    pub wants_to_crouch: bool,
}

/// Snapshot of one predicted client move
///
/// Never mutated after capture; combining produces a new move.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SavedMove {
    base: MoveInput,
    intent: MovementIntent,
    start_location: Vec3,
    start_velocity: Vec3,
    end_location: Vec3,
}

impl SavedMove {
    /// Capture a move and the modifier's current intent
    pub fn capture(modifier: &MovementModifier, base: MoveInput) -> Self {
        Self {
            base,
            intent: modifier.intent(),
            ..Default::default()
        }
    }

    /// Record the kinematic state the move is simulated from
    pub fn starting_from(self, location: Vec3, velocity: Vec3) -> Self {
        Self {
            start_location: location,
            start_velocity: velocity,
            ..self
        }
    }

    /// Record where the character ended up after simulating this move
    pub fn post_update(self, end_location: Vec3) -> Self {
        Self {
            end_location,
            ..self
        }
    }

    /// Rebuild a move from its base fields and compressed flags
    pub fn from_flags(base: MoveInput, flags: CompressedFlags) -> Self {
        Self {
            base: MoveInput {
                jump_pressed: flags.contains(CompressedFlags::JUMP_PRESSED),
                wants_to_crouch: flags.contains(CompressedFlags::WANTS_TO_CROUCH),
                ..base
            },
            intent: flags.intent(),
            ..Default::default()
        }
    }

    /// Location the move is simulated from
    pub fn start_location(&self) -> Vec3 {
        self.start_location
    }

    pub fn start_velocity(&self) -> Vec3 {
        self.start_velocity
    }

    pub fn base(&self) -> &MoveInput {
        &self.base
    }

    pub fn timestamp(&self) -> f32 {
        self.base.timestamp
    }

    pub fn delta_time(&self) -> f32 {
        self.base.delta_time
    }

    pub fn input(&self) -> Vec3 {
        self.base.input
    }

    pub fn intent(&self) -> MovementIntent {
        self.intent
    }

    pub fn end_location(&self) -> Vec3 {
        self.end_location
    }

    /// Pack the boolean state into the flags byte
    pub fn compressed_flags(&self) -> CompressedFlags {
        let mut flags = CompressedFlags::default();
        flags.set(CompressedFlags::JUMP_PRESSED, self.base.jump_pressed);
        flags.set(CompressedFlags::WANTS_TO_CROUCH, self.base.wants_to_crouch);
        flags.with_intent(self.intent)
    }

    /// Whether `new` can be merged into this move without changing the outcome
    pub fn can_combine_with(&self, new: &SavedMove, max_delta: f32) -> bool {
        if self.intent.sprint != new.intent.sprint {
            return false;
        }
        if self.intent.aim_down_sights != new.intent.aim_down_sights {
            return false;
        }

        let (a, b) = (self.base.input, new.base.input);
        if (a == Vec3::ZERO) != (b == Vec3::ZERO) {
            return false;
        }
        if a != Vec3::ZERO {
            if a.normalize().dot(b.normalize()) < INPUT_DOT_THRESHOLD_COMBINE {
                return false;
            }
            if (a.length() - b.length()).abs() > INPUT_MAG_THRESHOLD_COMBINE {
                return false;
            }
        }

        if self.compressed_flags() != new.compressed_flags() {
            return false;
        }

        self.base.delta_time + new.base.delta_time < max_delta
    }

    /// Merge `new` into this move
    ///
    /// The result starts where this move started and must be simulated again
    /// from there as a single step of the summed delta time.
    pub fn combine_with(&self, new: &SavedMove) -> SavedMove {
        SavedMove {
            base: MoveInput {
                delta_time: self.base.delta_time + new.base.delta_time,
                ..new.base
            },
            intent: new.intent,
            start_location: self.start_location,
            start_velocity: self.start_velocity,
            end_location: new.end_location,
        }
    }

    /// Reset to an empty move
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
