//! Orbit camera with damped user input and the idle-motion overlay.

use std::f32::consts::PI;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::config::{CameraConfig, IdleMotionConfig};

const POLAR_EPSILON: f32 = 1e-3;

/// A value that chases its target by a fixed fraction per step.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Damped<T> {
    pub current: T,
    pub target: T,
}

impl<T> Damped<T>
where
    T: Copy + std::ops::Sub<Output = T> + std::ops::Add<Output = T> + std::ops::Mul<f32, Output = T>,
{
    pub fn new(value: T) -> Self {
        Self {
            current: value,
            target: value,
        }
    }

    pub fn step(&mut self, fraction: f32) {
        self.current = self.current + (self.target - self.current) * fraction;
    }
}

/// Raw deltas from whatever drives the camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CameraInput {
    /// Radians of azimuth / polar change.
    Orbit { dx: f32, dy: f32 },
    /// Multiplies the target distance; `< 1` zooms in.
    Zoom(f32),
    /// Pointer pixels, scaled by distance and `pan_speed`.
    Pan { dx: f32, dy: f32 },
}

#[derive(Debug, Clone)]
pub struct CameraController {
    config: CameraConfig,
    distance: Damped<f32>,
    azimuth: Damped<f32>,
    polar: Damped<f32>,
    target: Damped<Vec3>,
    aspect: f32,
}

impl CameraController {
    /// Starts on +z looking at the origin.
    pub fn new(config: CameraConfig) -> Self {
        let distance = config
            .distance
            .clamp(config.min_distance, config.max_distance);
        Self {
            config,
            distance: Damped::new(distance),
            azimuth: Damped::new(0.0),
            polar: Damped::new(PI / 2.0),
            target: Damped::new(Vec3::ZERO),
            aspect: 1.0,
        }
    }

    pub fn distance(&self) -> f32 {
        self.distance.current
    }

    pub fn target_distance(&self) -> f32 {
        self.distance.target
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth.current
    }

    pub fn polar(&self) -> f32 {
        self.polar.current
    }

    pub fn look_at(&self) -> Vec3 {
        self.target.current
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    fn clamp_distance(&self, d: f32) -> f32 {
        d.clamp(self.config.min_distance, self.config.max_distance)
    }

    fn clamp_polar(p: f32) -> f32 {
        p.clamp(POLAR_EPSILON, PI - POLAR_EPSILON)
    }

    /// Moves the targets; the current values catch up in `step`.
    pub fn apply(&mut self, input: CameraInput) {
        match input {
            CameraInput::Orbit { dx, dy } => {
                self.azimuth.target -= dx;
                self.polar.target = Self::clamp_polar(self.polar.target - dy);
            }
            CameraInput::Zoom(factor) => {
                if factor.is_finite() && factor > 0.0 {
                    self.distance.target = self.clamp_distance(self.distance.target * factor);
                }
            }
            CameraInput::Pan { dx, dy } => {
                let (right, up) = self.basis();
                let scale = self.config.pan_speed * self.distance.current;
                self.target.target += (-right * dx + up * dy) * scale;
            }
        }
    }

    /// One damping step. Distance is clamped again afterwards.
    pub fn step(&mut self) {
        let k = self.config.damping;
        self.distance.step(k);
        self.distance.current = self.clamp_distance(self.distance.current);
        self.azimuth.step(k);
        self.polar.step(k);
        self.polar.current = Self::clamp_polar(self.polar.current);
        self.target.step(k);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    fn orbit_direction(&self) -> Vec3 {
        let (sin_p, cos_p) = self.polar.current.sin_cos();
        let (sin_a, cos_a) = self.azimuth.current.sin_cos();
        Vec3::new(sin_p * sin_a, cos_p, sin_p * cos_a)
    }

    fn basis(&self) -> (Vec3, Vec3) {
        let forward = -self.orbit_direction();
        let right = forward.cross(Vec3::Y).normalize_or(Vec3::X);
        let up = right.cross(forward);
        (right, up)
    }

    /// Damped orbit position plus `offset`, looking at the damped target.
    pub fn eye(&self, offset: Vec3) -> Vec3 {
        self.target.current + self.orbit_direction() * self.distance.current + offset
    }

    pub fn view_proj(&self, offset: Vec3) -> (Mat4, Vec3) {
        let eye = self.eye(offset);
        let view = Mat4::look_at_rh(eye, self.target.current, Vec3::Y);
        let proj = Mat4::perspective_rh(
            self.config.fov_y_degrees.to_radians(),
            self.aspect,
            self.config.near,
            self.config.far,
        );
        (proj * view, eye)
    }
}

/// Transform of the label group and the camera bob for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IdlePose {
    pub group: Mat4,
    pub camera_offset: Vec3,
}

/// Periodic overlay driven by monotonic elapsed time.
#[derive(Debug, Clone)]
pub struct IdleMotion {
    config: IdleMotionConfig,
    enabled: bool,
    t: f32,
}

impl IdleMotion {
    pub fn new(config: IdleMotionConfig, enabled: bool) -> Self {
        Self {
            config,
            enabled,
            t: 0.0,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// `elapsed` is seconds since start, not a delta.
    pub fn advance(&mut self, elapsed: f32) {
        self.t = elapsed;
    }

    pub fn pose(&self) -> IdlePose {
        let c = &self.config;
        let [tilt_x, tilt_y] = c.base_tilt;
        if !self.enabled {
            return IdlePose {
                group: Mat4::from_quat(Quat::from_euler(EulerRot::XYZ, tilt_x, tilt_y, 0.0)),
                camera_offset: Vec3::ZERO,
            };
        }

        let t = self.t;
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            tilt_x,
            tilt_y + c.group_rot_y.sample(t),
            c.group_rot_z.sample(t),
        );
        let translation = Vec3::new(c.group_pos_x.sample(t), 0.0, 0.0);
        IdlePose {
            group: Mat4::from_rotation_translation(rotation, translation),
            camera_offset: Vec3::new(c.camera_x.sample(t), c.camera_y.sample(t), 0.0),
        }
    }
}
