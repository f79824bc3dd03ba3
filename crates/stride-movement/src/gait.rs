//! Locomotion tiers

use serde::{Deserialize, Serialize};

/// Discrete locomotion tier governing the active speed cap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gait {
    #[default]
    Walking,
    Running,
    Sprinting,
}

impl Gait {
    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Walking => "Walking",
            Self::Running => "Running",
            Self::Sprinting => "Sprinting",
        }
    }
}
