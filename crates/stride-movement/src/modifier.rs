//! Sprint / ADS movement modifier

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::gait::Gait;
use crate::intent::{CompressedFlags, MovementIntent};
use crate::owner::{MovementOwner, NetRole};
use crate::policy::{BaseMovement, KinematicState, MovementPolicy};
use crate::settings::MovementSettings;

/// Client-to-authority request to change the allowed gait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerGaitRequest {
    pub gait: Gait,
}

/// Outcome of [`MovementModifier::set_allowed_gait`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaitChange {
    /// Gait was already active
    Unchanged,
    /// Cap will be applied on the next movement update
    Deferred,
    /// Deferred locally; the request must also be sent to the authority
    Forward(ServerGaitRequest),
    /// Cap applied immediately (simulated replica)
    Applied,
}

/// Standing and crouched speed caps pushed by gait changes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedCaps {
    pub max_walk_speed: f32,
    pub max_walk_speed_crouched: f32,
}

impl Default for SpeedCaps {
    fn default() -> Self {
        Self {
            max_walk_speed: 600.0,
            max_walk_speed_crouched: 300.0,
        }
    }
}

/// Movement policy adding sprint and aim-down-sights on top of per-gait settings
#[derive(Debug, Clone)]
pub struct MovementModifier {
    /// Multiplier on the owner's move speed while sprinting
    pub sprint_speed_multiplier: f32,
    /// Multiplier on the owner's move speed while aiming down sights
    pub ads_speed_multiplier: f32,
    /// Integrator defaults used when no curve applies
    pub base: BaseMovement,
    settings: MovementSettings,
    allowed_gait: Gait,
    intent: MovementIntent,
    caps: SpeedCaps,
    request_settings_change: bool,
}

impl Default for MovementModifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MovementModifier {
    pub fn new() -> Self {
        Self {
            sprint_speed_multiplier: 1.4,
            ads_speed_multiplier: 0.5,
            base: BaseMovement::default(),
            settings: MovementSettings::default(),
            allowed_gait: Gait::default(),
            intent: MovementIntent::default(),
            caps: SpeedCaps::default(),
            request_settings_change: false,
        }
    }

    /// Replace the active settings; caps are recomputed on the next movement update
    pub fn set_movement_settings(&mut self, settings: MovementSettings) {
        self.settings = settings;
        self.request_settings_change = true;
    }

    /// Settings as last pushed by the owner
    pub fn movement_settings(&self) -> &MovementSettings {
        &self.settings
    }

    /// Change the allowed gait according to the owner's network role
    pub fn set_allowed_gait(&mut self, gait: Gait, owner: &dyn MovementOwner) -> GaitChange {
        if self.allowed_gait == gait {
            return GaitChange::Unchanged;
        }

        if owner.is_locally_controlled() {
            self.allowed_gait = gait;
            self.request_settings_change = true;
            if owner.net_role() == NetRole::AutonomousProxy {
                debug!("Forwarding gait {} to authority", gait.name());
                return GaitChange::Forward(ServerGaitRequest { gait });
            }
            return GaitChange::Deferred;
        }

        if owner.net_role().has_authority() {
            self.allowed_gait = gait;
            self.request_settings_change = true;
            return GaitChange::Deferred;
        }

        self.allowed_gait = gait;
        self.apply_gait_cap();
        GaitChange::Applied
    }

    /// Authority-side handler for a forwarded gait request
    pub fn server_set_allowed_gait(&mut self, request: ServerGaitRequest) {
        if self.allowed_gait != request.gait {
            self.allowed_gait = request.gait;
            self.request_settings_change = true;
        }
    }

    /// Gait whose speed cap is active or pending
    pub fn allowed_gait(&self) -> Gait {
        self.allowed_gait
    }

    /// Request sprinting from the next speed query
    pub fn start_sprinting(&mut self) {
        self.intent.sprint = true;
    }

    /// Release the sprint request
    pub fn stop_sprinting(&mut self) {
        self.intent.sprint = false;
    }

    /// Request aiming down sights; sprinting still takes precedence
    pub fn start_aim_down_sights(&mut self) {
        self.intent.aim_down_sights = true;
    }

    /// Release the aim-down-sights request
    pub fn stop_aim_down_sights(&mut self) {
        self.intent.aim_down_sights = false;
    }

    /// Current sprint and ADS requests
    pub fn intent(&self) -> MovementIntent {
        self.intent
    }

    /// Restore intent from a saved or received move
    pub fn update_from_compressed_flags(&mut self, flags: CompressedFlags) {
        self.intent = flags.intent();
    }

    /// Caps as of the last movement update
    pub fn speed_caps(&self) -> SpeedCaps {
        self.caps
    }

    /// Whether a settings or gait change is waiting for the next movement update
    pub fn has_pending_settings_change(&self) -> bool {
        self.request_settings_change
    }

    /// Horizontal speed of `velocity` mapped onto 0..=3
    pub fn mapped_speed(&self, velocity: Vec3) -> f32 {
        let speed = KinematicState {
            velocity,
            grounded: true,
        }
        .horizontal_speed();
        self.settings.mapped_speed(speed)
    }

    /// Post-update hook; applies a pending settings change exactly once
    pub fn on_movement_updated(&mut self) {
        if self.request_settings_change {
            self.apply_gait_cap();
            self.request_settings_change = false;
        }
    }

    fn apply_gait_cap(&mut self) {
        let speed = self.settings.speed_for_gait(self.allowed_gait);
        self.caps.max_walk_speed = speed;
        self.caps.max_walk_speed_crouched = speed;
        debug!("Applied {} speed cap {}", self.allowed_gait.name(), speed);
    }

    fn curve_value(&self, state: &KinematicState) -> Option<Vec3> {
        let curve = self.settings.movement_curve.as_ref()?;
        Some(curve.evaluate(self.mapped_speed(state.velocity)))
    }
}

impl MovementPolicy for MovementModifier {
    fn max_speed(&self, owner: Option<&dyn MovementOwner>) -> f32 {
        let Some(owner) = owner else {
            error!("max_speed() called without an owning character");
            return self.caps.max_walk_speed;
        };

        if !owner.is_alive() || owner.is_stunned() {
            return 0.0;
        }

        if self.intent.sprint {
            return owner.move_speed() * self.sprint_speed_multiplier;
        }

        if self.intent.aim_down_sights {
            return owner.move_speed() * self.ads_speed_multiplier;
        }

        owner.move_speed()
    }

    fn max_acceleration(&self, state: &KinematicState) -> f32 {
        if !state.grounded {
            return self.base.max_acceleration;
        }
        self.curve_value(state).map_or(self.base.max_acceleration, |v| v.x)
    }

    fn max_braking_deceleration(&self, state: &KinematicState) -> f32 {
        if !state.grounded {
            return self.base.braking_deceleration;
        }
        self.curve_value(state).map_or(self.base.braking_deceleration, |v| v.y)
    }

    fn friction_override(&self, state: &KinematicState) -> Option<f32> {
        self.curve_value(state).map(|v| v.z)
    }
}
