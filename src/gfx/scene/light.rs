//! Scene lights
//!
//! Intensity is a plain scalar multiplier on the light colour. A light with
//! intensity zero contributes nothing but stays in the scene.

use cgmath::{Vector3, Zero};

use crate::gfx::color::Color;

/// Index of a light in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Uniform light from every direction; position is ignored.
    Ambient,
    /// Cone of light from `position` towards `target`.
    Spot {
        /// Range; zero means unlimited.
        distance: f32,
        /// Half-angle of the cone in radians.
        angle: f32,
        /// Fraction of the cone over which light fades out, `0..=1`.
        penumbra: f32,
        decay: f32,
        target: Vector3<f32>,
    },
    /// Omnidirectional light from `position`.
    Point { distance: f32, decay: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
    pub position: Vector3<f32>,
    /// Recorded for completeness; shadows are not rendered.
    pub cast_shadow: bool,
}

impl Light {
    pub fn ambient(name: &str, color: Color, intensity: f32) -> Self {
        Self::with_kind(name, LightKind::Ambient, color, intensity)
    }

    /// Spot light aimed at the origin with a hard edge and linear falloff.
    pub fn spot(name: &str, color: Color, intensity: f32, distance: f32, angle: f32) -> Self {
        Self::with_kind(
            name,
            LightKind::Spot {
                distance,
                angle,
                penumbra: 0.0,
                decay: 1.0,
                target: Vector3::zero(),
            },
            color,
            intensity,
        )
    }

    pub fn point(name: &str, color: Color, intensity: f32, distance: f32) -> Self {
        Self::with_kind(
            name,
            LightKind::Point {
                distance,
                decay: 1.0,
            },
            color,
            intensity,
        )
    }

    fn with_kind(name: &str, kind: LightKind, color: Color, intensity: f32) -> Self {
        Self {
            name: name.to_string(),
            kind,
            color,
            intensity,
            position: Vector3::zero(),
            cast_shadow: false,
        }
    }

    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.position = position;
        self
    }

    pub fn is_on(&self) -> bool {
        self.intensity != 0.0
    }

    /// Colour already scaled by intensity, as the shader consumes it.
    pub fn radiance(&self) -> Color {
        self.color.scaled(self.intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spot_defaults() {
        let light = Light::spot("spot", Color::WHITE, 0.0, 1000.0, std::f32::consts::PI / 8.0);
        match light.kind {
            LightKind::Spot {
                penumbra,
                decay,
                target,
                ..
            } => {
                assert_eq!(penumbra, 0.0);
                assert_eq!(decay, 1.0);
                assert_eq!(target, Vector3::zero());
            }
            other => panic!("expected spot light, got {:?}", other),
        }
        assert!(!light.is_on());
    }

    #[test]
    fn test_radiance_scales_colour() {
        let light = Light::ambient("ambient", Color::rgb(1.0, 0.5, 0.0), 0.3);
        assert_eq!(light.radiance(), Color::rgb(0.3, 0.15, 0.0));
    }
}
