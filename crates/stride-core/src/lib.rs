//! Stride Core - Core types and utilities shared by the Stride crates
//!
//! This crate provides the foundational types used throughout the workspace:
//! - Mathematical primitives (re-exported from glam)
//! - Entity identifiers and debug colors
//! - Game time with fixed timesteps and global time dilation
//! - TOML config loading

pub mod config;
pub mod time;
pub mod types;

pub use config::{load_toml, ConfigError};
pub use glam::{Quat, Vec2, Vec3};
pub use time::{GameTime, TimeConfig};
pub use types::{Color, EntityId};
