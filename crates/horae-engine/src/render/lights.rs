use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::paint::Color;

/// Positional light with linear falloff to zero at `range`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub range: f32,
}

/// Fixed light rig: hemisphere ambient, one directional sun, one point light.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Lights {
    pub sky: Color,
    pub ground: Color,
    pub hemisphere_intensity: f32,
    pub sun_color: Color,
    pub sun_intensity: f32,
    /// Direction from the scene toward the sun. Need not be normalized.
    pub sun_direction: Vec3,
    pub point: Option<PointLight>,
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            sky: Color::WHITE,
            ground: Color::from_srgb_u8(0x44, 0x44, 0x44, 0xff),
            hemisphere_intensity: 0.6,
            sun_color: Color::WHITE,
            sun_intensity: 0.8,
            sun_direction: Vec3::new(1.0, 2.0, 3.0),
            point: None,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct LightsUniform {
    pub sky: [f32; 4],
    pub ground: [f32; 4],
    pub sun_color: [f32; 4],
    pub sun_dir: [f32; 4],
    pub point_color: [f32; 4],
    /// xyz: position, w: range (0 disables the light)
    pub point_pos: [f32; 4],
}

impl Lights {
    pub(super) fn to_uniform(&self) -> LightsUniform {
        let sun_dir = self.sun_direction.normalize_or(Vec3::Y);
        let (point_color, point_pos) = match self.point {
            Some(p) => (
                [p.color.r, p.color.g, p.color.b, p.intensity],
                [p.position.x, p.position.y, p.position.z, p.range.max(0.0)],
            ),
            None => ([0.0; 4], [0.0; 4]),
        };
        LightsUniform {
            sky: [self.sky.r, self.sky.g, self.sky.b, self.hemisphere_intensity],
            ground: [self.ground.r, self.ground.g, self.ground.b, 0.0],
            sun_color: [
                self.sun_color.r,
                self.sun_color.g,
                self.sun_color.b,
                self.sun_intensity,
            ],
            sun_dir: [sun_dir.x, sun_dir.y, sun_dir.z, 0.0],
            point_color,
            point_pos,
        }
    }
}
