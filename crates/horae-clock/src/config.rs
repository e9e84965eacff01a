//! Scene configuration.
//!
//! Plain structs with `Default`; the desk binary fills them from the command
//! line. Label extrusion values are presentation choices, kept here so both
//! labels stay consistent.

use glam::Vec3;
use horae_engine::paint::Color;
use horae_engine::render::{Lights, PointLight};

/// 12-hour ("02:05:09 PM") or 24-hour ("14:05:09") time strings.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum HourCycle {
    #[default]
    H12,
    H24,
}

/// Whether label materials survive geometry regeneration.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum MaterialPolicy {
    /// One material per label, mutated in place.
    #[default]
    Persistent,
    /// A fresh material per regeneration, swapped through the lifecycle manager.
    Ephemeral,
}

/// Extruded-text shape parameters, in world units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ExtrudeParams {
    /// Em size.
    pub size: f32,
    /// Straight wall depth along +z.
    pub depth: f32,
    /// Line steps per quadratic/cubic outline segment.
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelConfig {
    pub extrude: ExtrudeParams,
    /// Baseline height after centering.
    pub y_offset: f32,
}

impl LabelConfig {
    pub fn time_default() -> Self {
        Self {
            extrude: ExtrudeParams {
                size: 0.9,
                depth: 0.25,
                curve_segments: 12,
                bevel_enabled: true,
                bevel_thickness: 0.03,
                bevel_size: 0.02,
                bevel_offset: 0.0,
                bevel_segments: 3,
            },
            y_offset: 0.1,
        }
    }

    pub fn date_default() -> Self {
        Self {
            extrude: ExtrudeParams {
                size: 0.32,
                depth: 0.08,
                curve_segments: 6,
                bevel_enabled: true,
                bevel_thickness: 0.01,
                bevel_size: 0.006,
                bevel_offset: 0.0,
                bevel_segments: 2,
            },
            y_offset: -0.75,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraConfig {
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Fraction of the remaining delta covered per frame.
    pub damping: f32,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Target-plane units per pixel of pan, per unit of distance.
    pub pan_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 8.0,
            min_distance: 3.0,
            max_distance: 30.0,
            damping: 0.07,
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            pan_speed: 0.0015,
        }
    }
}

/// `amplitude * sin(frequency * t)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Wave {
    pub amplitude: f32,
    pub frequency: f32,
}

impl Wave {
    pub const fn new(amplitude: f32, frequency: f32) -> Self {
        Self {
            amplitude,
            frequency,
        }
    }

    #[inline]
    pub fn sample(self, t: f32) -> f32 {
        (t * self.frequency).sin() * self.amplitude
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IdleMotionConfig {
    pub group_rot_z: Wave,
    pub group_rot_y: Wave,
    pub group_pos_x: Wave,
    pub camera_x: Wave,
    pub camera_y: Wave,
    /// Resting tilt of the label group (x, y), applied with or without motion.
    pub base_tilt: [f32; 2],
}

impl Default for IdleMotionConfig {
    fn default() -> Self {
        Self {
            group_rot_z: Wave::new(0.08, 0.3),
            group_rot_y: Wave::new(0.12, 0.15),
            group_pos_x: Wave::new(0.08, 0.12),
            camera_x: Wave::new(0.2, 0.07),
            camera_y: Wave::new(0.06, 0.05),
            base_tilt: [-0.05, 0.03],
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightRig {
    pub sky: Color,
    pub ground: Color,
    pub hemisphere_intensity: f32,
    pub sun_color: Color,
    pub sun_intensity: f32,
    pub sun_position: Vec3,
    pub fill_color: Color,
    pub fill_intensity: f32,
    pub fill_range: f32,
    pub fill_position: Vec3,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            sky: Color::from_rgb_hex(0xffffff),
            ground: Color::from_rgb_hex(0x222222),
            hemisphere_intensity: 0.6,
            sun_color: Color::from_rgb_hex(0xffffff),
            sun_intensity: 0.8,
            sun_position: Vec3::new(5.0, 10.0, 7.0),
            fill_color: Color::from_rgb_hex(0x88aaff),
            fill_intensity: 0.6,
            fill_range: 20.0,
            fill_position: Vec3::new(-6.0, 2.0, 6.0),
        }
    }
}

impl LightRig {
    pub fn to_lights(&self) -> Lights {
        Lights {
            sky: self.sky,
            ground: self.ground,
            hemisphere_intensity: self.hemisphere_intensity,
            sun_color: self.sun_color,
            sun_intensity: self.sun_intensity,
            // The sun sits at `sun_position` looking at the origin.
            sun_direction: self.sun_position,
            point: Some(PointLight {
                color: self.fill_color,
                intensity: self.fill_intensity,
                position: self.fill_position,
                range: self.fill_range,
            }),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShadowConfig {
    pub plane_y: f32,
    pub opacity: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            plane_y: -2.6,
            opacity: 0.12,
        }
    }
}

/// Surface look of the two labels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelLook {
    pub time_color: Color,
    pub date_color: Color,
    pub metalness: f32,
    pub roughness: f32,
    /// Texture repeats per world unit.
    pub texture_scale: [f32; 2],
}

impl Default for LabelLook {
    fn default() -> Self {
        Self {
            time_color: Color::from_rgb_hex(0xe5f6ff),
            date_color: Color::from_rgb_hex(0xcfeeff),
            metalness: 0.1,
            roughness: 0.6,
            texture_scale: [0.25, 0.25],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClockConfig {
    pub time_label: LabelConfig,
    pub date_label: LabelConfig,
    pub look: LabelLook,
    pub camera: CameraConfig,
    pub idle: IdleMotionConfig,
    pub lights: LightRig,
    pub shadow: ShadowConfig,
    pub material_policy: MaterialPolicy,
    pub hour_cycle: HourCycle,
    pub background_color: Color,
    pub background_opacity: f32,
    pub rotate: bool,
    pub shadows: bool,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            time_label: LabelConfig::time_default(),
            date_label: LabelConfig::date_default(),
            look: LabelLook::default(),
            camera: CameraConfig::default(),
            idle: IdleMotionConfig::default(),
            lights: LightRig::default(),
            shadow: ShadowConfig::default(),
            material_policy: MaterialPolicy::Persistent,
            hour_cycle: HourCycle::H12,
            background_color: Color::from_rgb_hex(0x080808),
            background_opacity: 1.0,
            rotate: true,
            shadows: true,
        }
    }
}
