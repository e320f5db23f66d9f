//! Orbiting particle state.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::orbit;
use crate::trail::Trail;

/// A particle on a fixed circular orbit.
///
/// Only `angle` and `trail` change after creation.
#[derive(Debug, Clone)]
pub struct Particle {
    /// Current angular position in radians, in `[0, 2π)` once stepped.
    pub angle: f32,
    radius: f32,
    angular_speed: f32,
    color: Vec3,
    size: f32,
    pub trail: Trail,
}

impl Particle {
    pub fn new(angle: f32, radius: f32, angular_speed: f32, color: Vec3, size: f32) -> Self {
        Self::with_trail(angle, radius, angular_speed, color, size, Trail::new())
    }

    pub fn with_trail(
        angle: f32,
        radius: f32,
        angular_speed: f32,
        color: Vec3,
        size: f32,
        trail: Trail,
    ) -> Self {
        Self {
            angle,
            radius,
            angular_speed,
            color,
            size,
            trail,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Signed radians per frame; the sign is the direction of rotation.
    pub fn angular_speed(&self) -> f32 {
        self.angular_speed
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Position on the orbit at the current angle.
    pub fn position(&self) -> Vec3 {
        orbit::orbit_position(self.radius, self.angle)
    }
}

/// A point sprite as uploaded to the GPU, used for particles and backdrop orbs.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    /// Quad half-extent in scene units.
    pub size: f32,
    pub color: [f32; 3],
    pub opacity: f32,
}
