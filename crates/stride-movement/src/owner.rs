//! Capabilities the movement modifier queries on its owning character

use serde::{Deserialize, Serialize};

/// Status tag that zeroes the owner's speed
pub const STUN_TAG: &str = "State.Debuff.Stun";

/// Network role of a simulated character
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetRole {
    /// Source of truth for corrections (server, or standalone)
    #[default]
    Authority,
    /// Client-owned replica that predicts locally
    AutonomousProxy,
    /// Replica driven purely by replicated state
    SimulatedProxy,
}

impl NetRole {
    /// Whether this side owns the authoritative movement state
    pub fn has_authority(self) -> bool {
        matches!(self, Self::Authority)
    }
}

/// Character state the movement modifier reads each tick
pub trait MovementOwner {
    fn is_alive(&self) -> bool;

    /// Whether the owner currently carries the given status tag
    fn has_matching_tag(&self, tag: &str) -> bool;

    /// Base move speed before sprint/ADS multipliers
    fn move_speed(&self) -> f32;

    fn is_locally_controlled(&self) -> bool;

    fn net_role(&self) -> NetRole;

    fn is_crouching(&self) -> bool {
        false
    }

    fn is_stunned(&self) -> bool {
        self.has_matching_tag(STUN_TAG)
    }
}
