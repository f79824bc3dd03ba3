//! Kinematic capsule resolving integrated movement against the world

use glam::Vec3;
use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};
use rapier3d::prelude::*;
use tracing::warn;

use crate::traces::CollisionShape;
use crate::PhysicsWorld;

/// Capsule and stepping configuration, in centimeters
#[derive(Debug, Clone)]
pub struct CharacterControllerConfig {
    /// Capsule half height including the hemispheres
    pub half_height: f32,
    pub radius: f32,
    /// Maximum walkable slope in degrees
    pub max_slope_angle: f32,
    /// Step height for climbing stairs
    pub step_height: f32,
    /// Gap kept between the capsule and the world
    pub skin_width: f32,
    /// Maximum distance snapped down to stay on the ground
    pub ground_snap_distance: f32,
}

impl Default for CharacterControllerConfig {
    fn default() -> Self {
        Self {
            half_height: 90.0,
            radius: 40.0,
            max_slope_angle: 45.0,
            step_height: 25.0,
            skin_width: 2.0,
            ground_snap_distance: 20.0,
        }
    }
}

/// Moves a capsule by a velocity and reports where it ended up
pub struct CharacterController {
    pub config: CharacterControllerConfig,
    /// Capsule feet position
    pub position: Vec3,
    pub grounded: bool,
    collider_handle: Option<ColliderHandle>,
    controller: KinematicCharacterController,
}

impl CharacterController {
    pub fn new() -> Self {
        Self::with_config(CharacterControllerConfig::default())
    }

    pub fn with_config(config: CharacterControllerConfig) -> Self {
        let mut controller = KinematicCharacterController::default();
        controller.max_slope_climb_angle = config.max_slope_angle.to_radians();
        controller.min_slope_slide_angle = config.max_slope_angle.to_radians();
        controller.autostep = Some(CharacterAutostep {
            max_height: CharacterLength::Absolute(config.step_height),
            min_width: CharacterLength::Relative(0.5),
            include_dynamic_bodies: false,
        });
        controller.snap_to_ground = Some(CharacterLength::Absolute(config.ground_snap_distance));
        controller.offset = CharacterLength::Absolute(config.skin_width);

        Self {
            config,
            position: Vec3::ZERO,
            grounded: false,
            collider_handle: None,
            controller,
        }
    }

    /// Capsule description for traces and debug drawing
    pub fn shape(&self) -> CollisionShape {
        CollisionShape::Capsule {
            half_height: self.config.half_height,
            radius: self.config.radius,
        }
    }

    /// Capsule center for the current feet position
    pub fn center_position(&self) -> Vec3 {
        self.position + Vec3::Y * self.config.half_height
    }

    /// Add the capsule to the world at `position`
    pub fn spawn(&mut self, physics: &mut PhysicsWorld, position: Vec3) -> ColliderHandle {
        self.position = position;
        let center = self.center_position();
        let segment_half = (self.config.half_height - self.config.radius).max(0.01);
        let collider = ColliderBuilder::capsule_y(segment_half, self.config.radius)
            .translation(vector![center.x, center.y, center.z])
            .friction(0.0)
            .sensor(true)
            .build();

        let handle = physics.add_static_collider(collider);
        self.collider_handle = Some(handle);
        handle
    }

    /// Move by `velocity * dt`, sliding along obstacles
    ///
    /// Returns the position reached.
    pub fn apply_velocity(&mut self, physics: &mut PhysicsWorld, velocity: Vec3, dt: f32) -> Vec3 {
        let Some(handle) = self.collider_handle else {
            warn!("apply_velocity() called before spawn");
            return self.position;
        };
        let Some(collider) = physics.get_collider(handle) else {
            return self.position;
        };

        let center = self.center_position();
        let desired = velocity * dt;
        let movement = self.controller.move_shape(
            dt,
            &physics.rigid_body_set,
            &physics.collider_set,
            physics.query_pipeline(),
            collider.shape(),
            &Isometry::translation(center.x, center.y, center.z),
            vector![desired.x, desired.y, desired.z],
            QueryFilter::default().exclude_collider(handle),
            |_| {},
        );

        self.grounded = movement.grounded;
        self.position += Vec3::new(
            movement.translation.x,
            movement.translation.y,
            movement.translation.z,
        );

        let center = self.center_position();
        if let Some(collider) = physics.collider_set.get_mut(handle) {
            collider.set_translation(vector![center.x, center.y, center.z]);
        }
        self.position
    }

    /// Teleport without collision
    pub fn set_position(&mut self, physics: &mut PhysicsWorld, position: Vec3) {
        self.position = position;
        let center = self.center_position();
        if let Some(handle) = self.collider_handle {
            if let Some(collider) = physics.collider_set.get_mut(handle) {
                collider.set_translation(vector![center.x, center.y, center.z]);
            }
        }
    }
}

impl Default for CharacterController {
    fn default() -> Self {
        Self::new()
    }
}
