//! Stride Movement - Character movement policy
//!
//! Provides the sprint / aim-down-sights movement modifier, speed-curve driven
//! acceleration, braking and friction, and a reference ground integrator that
//! consumes any [`MovementPolicy`].

mod curve;
mod gait;
mod integrator;
mod intent;
mod modifier;
mod owner;
mod policy;
mod settings;

pub use curve::{CurveKey, SpeedCurve};
pub use gait::Gait;
pub use integrator::GroundIntegrator;
pub use intent::{CompressedFlags, MovementIntent};
pub use modifier::{GaitChange, MovementModifier, ServerGaitRequest, SpeedCaps};
pub use owner::{MovementOwner, NetRole, STUN_TAG};
pub use policy::{BaseMovement, KinematicState, MovementPolicy};
pub use settings::MovementSettings;
