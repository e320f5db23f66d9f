//! Perspective camera looking down at the orbit plane.

use glam::{Mat4, Vec3};

/// Camera on the +z axis looking at the origin.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// Distance from the orbit plane.
    pub distance: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
}

impl Camera {
    pub fn new(distance: f32, fov_degrees: f32) -> Self {
        Self {
            distance,
            fov_y: fov_degrees.to_radians(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.distance)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, 0.1, 100.0) * self.view_matrix()
    }

    /// Move towards or away from the plane by `amount`.
    pub fn zoom(&mut self, amount: f32) {
        self.distance = (self.distance - amount).clamp(1.0, 20.0);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(5.0, 75.0)
    }
}
