use crate::scene::Aabb;
use glam::{Mat4, Vec3};
use std::f32::consts::PI;

const EPS: f32 = 1e-6;
const MOVE_EPS: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub initial_position: [f32; 3],
    pub min_distance: f32,
    pub max_distance: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// Multiples of the bounding diagonal used for the fitted camera position.
    pub fit_ratios: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 30.0,
            near: 0.01,
            far: 1000.0,
            initial_position: [0.0, 2.0, 5.0],
            min_distance: 1.0,
            max_distance: 100.0,
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            fit_ratios: [1.5, 2.0, 1.5],
        }
    }
}

/// Perspective camera driven by orbit controls around `target`.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    rotate_speed: f32,
    zoom_speed: f32,
    fit_ratios: Vec3,
    pending_theta: f32,
    pending_phi: f32,
    pending_scale: f32,
}

impl OrbitCamera {
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            position: Vec3::from(config.initial_position),
            target: Vec3::ZERO,
            fov_y_deg: config.fov_y_deg,
            aspect,
            near: config.near,
            far: config.far,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            fit_ratios: Vec3::from(config.fit_ratios),
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_scale: 1.0,
        }
    }

    /// Frame `bounds`: target its center, and place the camera at fixed multiples of
    /// the bounding diagonal measured from the world origin.
    pub fn fit_to_bounds(&mut self, bounds: &Aabb) {
        let size = bounds.size().length();
        self.target = bounds.center();
        self.position = self.fit_ratios * size;
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).length()
    }

    /// Queue a drag of `dx`/`dy` pixels; a full viewport height is one turn.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.pending_theta -= 2.0 * PI * dx / height * self.rotate_speed;
        self.pending_phi -= 2.0 * PI * dy / height * self.rotate_speed;
    }

    /// Positive steps move closer to the target.
    pub fn zoom(&mut self, steps: f32) {
        self.pending_scale *= 0.95f32.powf(steps * self.zoom_speed);
    }

    /// Apply queued input, clamp the orbit distance, and decay damped motion.
    /// Returns whether the camera moved.
    pub fn update(&mut self) -> bool {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius < EPS {
            self.pending_scale = 1.0;
            return false;
        }

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();
        if self.enable_damping {
            theta += self.pending_theta * self.damping_factor;
            phi += self.pending_phi * self.damping_factor;
        } else {
            theta += self.pending_theta;
            phi += self.pending_phi;
        }
        phi = phi.clamp(EPS, PI - EPS);
        let radius = (radius * self.pending_scale).clamp(self.min_distance, self.max_distance);

        let sin_phi = phi.sin();
        let previous = self.position;
        self.position = self.target
            + Vec3::new(
                radius * sin_phi * theta.sin(),
                radius * phi.cos(),
                radius * sin_phi * theta.cos(),
            );

        if self.enable_damping {
            self.pending_theta *= 1.0 - self.damping_factor;
            self.pending_phi *= 1.0 - self.damping_factor;
        } else {
            self.pending_theta = 0.0;
            self.pending_phi = 0.0;
        }
        self.pending_scale = 1.0;

        (self.position - previous).length_squared() > MOVE_EPS * MOVE_EPS
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_deg.to_radians(),
            self.aspect.max(EPS),
            self.near,
            self.far,
        )
    }
}
