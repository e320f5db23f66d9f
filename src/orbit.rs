//! Orbit integrator.
//!
//! Each step adds a particle's own angular speed to its angle and places it at
//! `(r cos a, r sin a, 0)`. There is no radial motion, so a particle stays on
//! its orbit forever. Angles are kept in `[0, 2π)` so an `f32` step never
//! rounds away however long the swirl runs.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::particle::Particle;

/// Cartesian position on a circle of `radius` at `angle`.
#[inline]
pub fn orbit_position(radius: f32, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(radius * cos, radius * sin, 0.0)
}

/// Advance one particle by `step_scale` frames and return its new position.
#[inline]
pub fn step(particle: &mut Particle, step_scale: f32) -> Vec3 {
    let angle = particle.angle.rem_euclid(TAU);
    particle.angle = (angle + particle.angular_speed() * step_scale).rem_euclid(TAU);
    particle.position()
}

/// Signed shortest turn from `from` to `to`, in `(-π, π]`.
pub fn angular_delta(from: f32, to: f32) -> f32 {
    let d = (to - from).rem_euclid(TAU);
    if d > PI {
        d - TAU
    } else {
        d
    }
}

/// Advance every particle by `step_scale` frames.
///
/// A scale of `1.0` is exactly one frame's worth of angular speed.
pub fn advance(particles: &mut [Particle], step_scale: f32) {
    for particle in particles.iter_mut() {
        step(particle, step_scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn particle(angle: f32, radius: f32, speed: f32) -> Particle {
        Particle::new(angle, radius, speed, Vec3::ONE, 0.15)
    }

    #[test]
    fn test_orbit_position_axes() {
        let p = orbit_position(2.0, 0.0);
        assert!((p - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);

        let p = orbit_position(2.0, FRAC_PI_2);
        assert!((p - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_step_adds_speed() {
        let mut p = particle(0.0, 1.0, 0.01);
        step(&mut p, 1.0);
        assert!((p.angle - 0.01).abs() < 1e-7);
    }

    #[test]
    fn test_negative_speed_turns_clockwise() {
        let mut p = particle(PI, 1.0, -0.5);
        step(&mut p, 1.0);
        assert!(p.angle < PI);
    }

    #[test]
    fn test_large_angle_keeps_advancing() {
        let mut p = particle(70_000.0, 1.0, 0.003);
        let before = p.angle;
        step(&mut p, 1.0);
        assert!((0.0..TAU).contains(&p.angle));

        let turned = angular_delta(before.rem_euclid(TAU), p.angle);
        assert!((turned - 0.003).abs() < 1e-3, "turned {turned}");

        let start = p.angle;
        for _ in 0..1000 {
            step(&mut p, 1.0);
        }
        let turned = angular_delta(start, p.angle);
        assert!((turned - 3.0).abs() < 2e-3, "turned {turned}");
    }

    #[test]
    fn test_wrap_crosses_zero_both_ways() {
        let mut p = particle(TAU - 0.005, 1.0, 0.01);
        step(&mut p, 1.0);
        assert!((p.angle - 0.005).abs() < 1e-5);

        let mut q = particle(0.005, 1.0, -0.01);
        step(&mut q, 1.0);
        assert!((q.angle - (TAU - 0.005)).abs() < 1e-5);
    }

    #[test]
    fn test_angular_delta_is_shortest_turn() {
        assert!((angular_delta(0.1, TAU - 0.1) + 0.2).abs() < 1e-5);
        assert!((angular_delta(TAU - 0.1, 0.1) - 0.2).abs() < 1e-5);
        assert!((angular_delta(1.0, 1.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_radius_is_preserved() {
        let mut particles = vec![particle(0.3, 0.7, 0.02), particle(1.0, 1.9, -0.013)];
        for _ in 0..10_000 {
            advance(&mut particles, 1.0);
            for p in &particles {
                let pos = p.position();
                assert!(pos.z == 0.0);
                assert!((pos.truncate().length() - p.radius()).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_zero_scale_is_a_no_op() {
        let mut p = particle(0.25, 1.0, 0.1);
        step(&mut p, 0.0);
        assert_eq!(p.angle, 0.25);
    }
}
