//! Core types shared across Stride

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a simulated character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Linear RGBA color with floating point components (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Quantize to 8-bit channels, optionally encoding RGB as sRGB
    pub fn to_rgba8(&self, srgb: bool) -> [u8; 4] {
        let encode = |c: f32| {
            let c = c.clamp(0.0, 1.0);
            let c = if !srgb {
                c
            } else if c <= 0.003_130_8 {
                c * 12.92
            } else {
                1.055 * c.powf(1.0 / 2.4) - 0.055
            };
            (c * 255.0).round() as u8
        };
        let alpha = (self.a.clamp(0.0, 1.0) * 255.0).round() as u8;
        [encode(self.r), encode(self.g), encode(self.b), alpha]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ids_unique() {
        assert_ne!(EntityId::new(), EntityId::new());
    }

    #[test]
    fn test_rgba8_linear_and_srgb() {
        assert_eq!(Color::RED.to_rgba8(false), [255, 0, 0, 255]);
        assert_eq!(Color::rgb(0.5, 0.0, 1.0).to_rgba8(false), [128, 0, 255, 255]);
        // sRGB brightens mid tones
        let srgb = Color::rgb(0.5, 0.5, 0.5).to_rgba8(true);
        assert_eq!(srgb[0], 188);
    }
}
