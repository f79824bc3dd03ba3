//! Reference ground integrator driving a [`MovementPolicy`]

use glam::Vec3;

use crate::owner::MovementOwner;
use crate::policy::{KinematicState, MovementPolicy};

/// Below this horizontal speed braking snaps to a full stop
const BRAKE_TO_STOP_SPEED: f32 = 10.0;

/// Squared-speed slack before a velocity counts as over the cap
const OVER_MAX_TOLERANCE: f32 = 1.01;

/// Owns the movement step loop and asks a policy for its limits each step
#[derive(Debug, Clone)]
pub struct GroundIntegrator {
    pub position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
    /// Friction used when the policy has no override
    pub ground_friction: f32,
    /// Vertical acceleration while airborne
    pub gravity: f32,
}

impl Default for GroundIntegrator {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            grounded: true,
            ground_friction: 8.0,
            gravity: -980.0,
        }
    }
}

impl GroundIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot handed to the policy
    pub fn state(&self) -> KinematicState {
        KinematicState {
            velocity: self.velocity,
            grounded: self.grounded,
        }
    }

    /// Advance one step; `input` is the desired move direction, length up to 1
    pub fn step(
        &mut self,
        policy: &dyn MovementPolicy,
        owner: Option<&dyn MovementOwner>,
        input: Vec3,
        dt: f32,
    ) -> KinematicState {
        let state = self.state();

        let friction = if self.grounded {
            policy
                .friction_override(&state)
                .unwrap_or(self.ground_friction)
        } else {
            0.0
        };
        let max_speed = policy.max_speed(owner).max(0.0);
        let max_accel = policy.max_acceleration(&state);

        let input = Vec3::new(input.x, 0.0, input.z).clamp_length_max(1.0);
        let accel = input * max_accel;
        let mut horizontal = Vec3::new(self.velocity.x, 0.0, self.velocity.z);

        let over_max = horizontal.length_squared() > max_speed * max_speed * OVER_MAX_TOLERANCE;
        if accel == Vec3::ZERO || over_max {
            let old = horizontal;
            let braking = policy.max_braking_deceleration(&state);
            let decel = (braking + friction * old.length()) * dt;
            horizontal = move_towards_vec3(old, Vec3::ZERO, decel);

            if accel == Vec3::ZERO {
                if horizontal.length() < BRAKE_TO_STOP_SPEED {
                    horizontal = Vec3::ZERO;
                }
            } else if horizontal.length_squared() < max_speed * max_speed && accel.dot(old) > 0.0 {
                // Braking never drops a character below max speed while it pushes forward
                horizontal = old.normalize_or_zero() * max_speed;
            }
        }

        if accel != Vec3::ZERO {
            // Friction steers existing velocity toward the input direction
            let dir = accel.normalize();
            let speed = horizontal.length();
            horizontal -= (horizontal - dir * speed) * (dt * friction).min(1.0);
            horizontal += accel * dt;
            horizontal = horizontal.clamp_length_max(max_speed);
        }

        let vertical = if self.grounded {
            0.0
        } else {
            self.velocity.y + self.gravity * dt
        };

        self.velocity = Vec3::new(horizontal.x, vertical, horizontal.z);
        self.position += self.velocity * dt;
        self.state()
    }
}

/// Move a vector towards a target by a maximum delta
fn move_towards_vec3(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let diff = target - current;
    let distance = diff.length();

    if distance <= max_delta || distance == 0.0 {
        target
    } else {
        current + diff / distance * max_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::SpeedCurve;
    use crate::modifier::MovementModifier;
    use crate::owner::NetRole;
    use crate::settings::MovementSettings;

    struct Runner {
        alive: bool,
    }

    impl MovementOwner for Runner {
        fn is_alive(&self) -> bool {
            self.alive
        }

        fn has_matching_tag(&self, _tag: &str) -> bool {
            false
        }

        fn move_speed(&self) -> f32 {
            400.0
        }

        fn is_locally_controlled(&self) -> bool {
            true
        }

        fn net_role(&self) -> NetRole {
            NetRole::Authority
        }
    }

    const DT: f32 = 1.0 / 60.0;

    fn curved_modifier() -> MovementModifier {
        let mut m = MovementModifier::new();
        m.set_movement_settings(MovementSettings::new(200.0, 400.0, 600.0).with_curve(
            SpeedCurve::from_points(&[
                (0.0, Vec3::new(2000.0, 2000.0, 8.0)),
                (3.0, Vec3::new(800.0, 1000.0, 2.0)),
            ]),
        ));
        m.on_movement_updated();
        m
    }

    #[test]
    fn test_move_towards() {
        let result = move_towards_vec3(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 5.0);
        assert!((result.x - 5.0).abs() < 0.001);
        assert_eq!(move_towards_vec3(Vec3::X, Vec3::ZERO, 5.0), Vec3::ZERO);
    }

    #[test]
    fn test_accelerates_to_max_speed() {
        let m = MovementModifier::new();
        let owner = Runner { alive: true };
        let mut integrator = GroundIntegrator::new();
        for _ in 0..120 {
            integrator.step(&m, Some(&owner), Vec3::X, DT);
        }
        assert!((integrator.state().horizontal_speed() - 400.0).abs() < 1e-2);
        assert!(integrator.position.x > 0.0);
    }

    #[test]
    fn test_sprint_raises_top_speed() {
        let mut m = MovementModifier::new();
        m.start_sprinting();
        let owner = Runner { alive: true };
        let mut integrator = GroundIntegrator::new();
        for _ in 0..240 {
            integrator.step(&m, Some(&owner), Vec3::Z, DT);
        }
        assert!((integrator.state().horizontal_speed() - 560.0).abs() < 1e-1);

        m.stop_sprinting();
        integrator.step(&m, Some(&owner), Vec3::Z, DT);
        assert!((integrator.state().horizontal_speed() - 400.0).abs() < 1e-1);
    }

    #[test]
    fn test_brakes_to_stop_without_input() {
        let m = curved_modifier();
        let owner = Runner { alive: true };
        let mut integrator = GroundIntegrator::new();
        integrator.velocity = Vec3::new(400.0, 0.0, 0.0);
        for _ in 0..60 {
            integrator.step(&m, Some(&owner), Vec3::ZERO, DT);
        }
        assert_eq!(integrator.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_dead_owner_sheds_speed() {
        let m = MovementModifier::new();
        let owner = Runner { alive: false };
        let mut integrator = GroundIntegrator::new();
        integrator.velocity = Vec3::new(300.0, 0.0, 0.0);
        let before = integrator.state().horizontal_speed();
        integrator.step(&m, Some(&owner), Vec3::X, DT);
        assert!(integrator.state().horizontal_speed() < before);
        for _ in 0..60 {
            integrator.step(&m, Some(&owner), Vec3::X, DT);
        }
        assert_eq!(integrator.state().horizontal_speed(), 0.0);
    }

    #[test]
    fn test_airborne_applies_gravity() {
        let m = MovementModifier::new();
        let owner = Runner { alive: true };
        let mut integrator = GroundIntegrator::new();
        integrator.grounded = false;
        integrator.step(&m, Some(&owner), Vec3::ZERO, 0.1);
        assert!((integrator.velocity.y + 98.0).abs() < 1e-3);
    }

    #[test]
    fn test_steps_are_deterministic() {
        let owner = Runner { alive: true };
        let inputs = [Vec3::X, Vec3::new(0.7, 0.0, 0.7), Vec3::ZERO, Vec3::Z];

        let run = || {
            let mut m = curved_modifier();
            let mut integrator = GroundIntegrator::new();
            for (i, input) in inputs.iter().cycle().take(200).enumerate() {
                if i % 50 == 10 {
                    m.start_sprinting();
                } else if i % 50 == 30 {
                    m.stop_sprinting();
                }
                integrator.step(&m, Some(&owner), *input, DT);
            }
            (integrator.position, integrator.velocity)
        };

        let (pos_a, vel_a) = run();
        let (pos_b, vel_b) = run();
        assert_eq!(pos_a.to_array().map(f32::to_bits), pos_b.to_array().map(f32::to_bits));
        assert_eq!(vel_a.to_array().map(f32::to_bits), vel_b.to_array().map(f32::to_bits));
    }
}
