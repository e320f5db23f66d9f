//! Particle emitters built from ring descriptors.
//!
//! An [`Emitter`] turns an ordered list of [`Ring`]s into the fixed particle
//! set the visualizer animates for its whole lifetime. Each ring contributes
//! `count` particles spread evenly around a full turn, then nudged by a little
//! randomness so nothing lines up too neatly.
//!
//! # Per-particle derivation
//!
//! | Attribute | Value |
//! |-----------|-------|
//! | angle | `2π·i/count ± angle_jitter` |
//! | radius | `ring.radius + k·radius_step + U(0, radius_jitter)` (k counts across all rings) |
//! | angular speed | `base_speed`, sign chosen by coin flip |
//! | colour | uniform pick from the palette |
//! | size | `U(size_min, size_max)` |
//!
//! Because `radius_jitter < radius_step`, radii strictly increase along the
//! emitted sequence and no two particles share an orbit.
//!
//! # Example
//!
//! ```ignore
//! let emitter = Emitter::new(vec![Ring::new(1.0, 4, 0.01)], Palette::cosmic())?;
//! let particles = emitter.emit(&mut rand::thread_rng());
//! assert_eq!(particles.len(), 4);
//! ```

use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SwirlError};
use crate::particle::Particle;
use crate::trail::{Trail, MAX_TRAIL_LENGTH};
use crate::visuals::Palette;

/// One orbital band of particles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    /// Base orbit radius in scene units.
    pub radius: f32,
    /// Number of particles on this ring.
    pub count: u32,
    /// Angular speed magnitude in radians per frame.
    pub base_speed: f32,
}

impl Ring {
    pub const fn new(radius: f32, count: u32, base_speed: f32) -> Self {
        Self {
            radius,
            count,
            base_speed,
        }
    }

    /// Reject non-positive radius or count and non-finite speed.
    pub fn validate(&self, index: usize) -> Result<()> {
        let invalid = |reason: &str| SwirlError::InvalidRing {
            index,
            reason: reason.to_string(),
        };
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(invalid("radius must be a positive finite number"));
        }
        if self.count == 0 {
            return Err(invalid("count must be at least 1"));
        }
        if !self.base_speed.is_finite() {
            return Err(invalid("base speed must be finite"));
        }
        Ok(())
    }
}

/// The stock six-ring layout, innermost first.
pub const DEFAULT_RINGS: [Ring; 6] = [
    Ring::new(0.4, 1, 0.01),
    Ring::new(0.5, 2, 0.0075),
    Ring::new(0.6, 2, 0.006),
    Ring::new(0.7, 2, 0.005),
    Ring::new(0.8, 2, 0.003),
    Ring::new(0.9, 1, 0.003),
];

/// Randomisation applied on top of the ring layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Jitter {
    /// Maximum angular perturbation either way, radians.
    pub angle: f32,
    /// Radius added per emitted particle.
    pub radius_step: f32,
    /// Maximum extra radius on top of the step. Must stay below `radius_step`.
    pub radius_jitter: f32,
    /// Inclusive particle size range in scene units.
    pub size_range: [f32; 2],
}

impl Default for Jitter {
    fn default() -> Self {
        Self {
            angle: 0.6,
            radius_step: 0.12,
            radius_jitter: 0.08,
            size_range: [0.12, 0.20],
        }
    }
}

impl Jitter {
    pub fn validate(&self) -> Result<()> {
        let [min, max] = self.size_range;
        if !self.angle.is_finite() || self.angle < 0.0 {
            return Err(SwirlError::Config("angle jitter must be finite and >= 0".into()));
        }
        if !self.radius_step.is_finite() || self.radius_step <= 0.0 {
            return Err(SwirlError::Config("radius step must be positive".into()));
        }
        if !(0.0..self.radius_step).contains(&self.radius_jitter) {
            return Err(SwirlError::Config(format!(
                "radius jitter {} must be in [0, radius step {})",
                self.radius_jitter, self.radius_step
            )));
        }
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || max < min {
            return Err(SwirlError::Config(format!(
                "size range [{min}, {max}] must be positive and ordered"
            )));
        }
        Ok(())
    }
}

/// Derives the particle set from ring descriptors.
#[derive(Debug, Clone)]
pub struct Emitter {
    rings: Vec<Ring>,
    palette: Palette,
    jitter: Jitter,
    trail_length: usize,
}

impl Emitter {
    /// Validate the rings and build an emitter with default jitter.
    pub fn new(rings: Vec<Ring>, palette: Palette) -> Result<Self> {
        if rings.is_empty() {
            return Err(SwirlError::Config("at least one ring is required".into()));
        }
        for (index, ring) in rings.iter().enumerate() {
            ring.validate(index)?;
        }
        Ok(Self {
            rings,
            palette,
            jitter: Jitter::default(),
            trail_length: MAX_TRAIL_LENGTH,
        })
    }

    /// Replace the randomisation parameters.
    pub fn with_jitter(mut self, jitter: Jitter) -> Result<Self> {
        jitter.validate()?;
        self.jitter = jitter;
        Ok(self)
    }

    /// Cap each particle's trail at `length` (at most [`MAX_TRAIL_LENGTH`]).
    pub fn with_trail_length(mut self, length: usize) -> Self {
        self.trail_length = length.clamp(1, MAX_TRAIL_LENGTH);
        self
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    /// Total particles [`Emitter::emit`] will produce.
    pub fn particle_count(&self) -> usize {
        self.rings.iter().map(|r| r.count as usize).sum()
    }

    /// Generate the particle set using `rng` for all randomness.
    pub fn emit<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Particle> {
        let jitter = &self.jitter;
        let [size_min, size_max] = jitter.size_range;
        let mut particles = Vec::with_capacity(self.particle_count());

        for ring in &self.rings {
            for i in 0..ring.count {
                let k = particles.len() as f32;

                let angle = TAU * i as f32 / ring.count as f32
                    + rng.gen_range(-jitter.angle..=jitter.angle);
                let radius =
                    ring.radius + k * jitter.radius_step + rng.gen_range(0.0..=jitter.radius_jitter);
                let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                let color = self.palette.pick(rng);
                let size = rng.gen_range(size_min..=size_max);

                particles.push(Particle::with_trail(
                    angle,
                    radius,
                    ring.base_speed * direction,
                    color,
                    size,
                    Trail::with_capacity(self.trail_length),
                ));
            }
        }

        particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn test_default_rings_emit_ten_particles() {
        let emitter = Emitter::new(DEFAULT_RINGS.to_vec(), Palette::cosmic()).unwrap();
        assert_eq!(emitter.particle_count(), 10);
        assert_eq!(emitter.emit(&mut rng()).len(), 10);
    }

    #[test]
    fn test_zero_count_rejected() {
        let err = Emitter::new(vec![Ring::new(1.0, 4, 0.01), Ring::new(1.0, 0, 0.01)], Palette::cosmic())
            .unwrap_err();
        assert!(matches!(err, SwirlError::InvalidRing { index: 1, .. }));
    }

    #[test]
    fn test_bad_radius_rejected() {
        for radius in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let result = Emitter::new(vec![Ring::new(radius, 1, 0.01)], Palette::cosmic());
            assert!(result.is_err(), "radius {radius} accepted");
        }
    }

    #[test]
    fn test_empty_ring_list_rejected() {
        assert!(Emitter::new(Vec::new(), Palette::cosmic()).is_err());
    }

    #[test]
    fn test_radii_strictly_increase() {
        let emitter = Emitter::new(DEFAULT_RINGS.to_vec(), Palette::cosmic()).unwrap();
        for seed in 0..20 {
            let particles = emitter.emit(&mut StdRng::seed_from_u64(seed));
            for pair in particles.windows(2) {
                assert!(pair[1].radius() > pair[0].radius());
            }
        }
    }

    #[test]
    fn test_angles_within_jitter_of_even_spacing() {
        let emitter = Emitter::new(vec![Ring::new(1.0, 4, 0.01)], Palette::cosmic()).unwrap();
        let particles = emitter.emit(&mut rng());
        for (i, p) in particles.iter().enumerate() {
            let base = TAU * i as f32 / 4.0;
            assert!((p.angle - base).abs() <= 0.6 + 1e-6);
        }
    }

    #[test]
    fn test_sizes_within_range() {
        let emitter = Emitter::new(DEFAULT_RINGS.to_vec(), Palette::cosmic()).unwrap();
        for p in emitter.emit(&mut rng()) {
            assert!((0.12..=0.20).contains(&p.size()));
        }
    }

    #[test]
    fn test_both_directions_appear() {
        let emitter = Emitter::new(vec![Ring::new(1.0, 64, 0.01)], Palette::cosmic()).unwrap();
        let particles = emitter.emit(&mut rng());
        assert!(particles.iter().any(|p| p.angular_speed() > 0.0));
        assert!(particles.iter().any(|p| p.angular_speed() < 0.0));
    }

    #[test]
    fn test_jitter_must_stay_below_step() {
        let emitter = Emitter::new(DEFAULT_RINGS.to_vec(), Palette::cosmic()).unwrap();
        let jitter = Jitter {
            radius_jitter: 0.2,
            ..Jitter::default()
        };
        assert!(emitter.with_jitter(jitter).is_err());
    }

    #[test]
    fn test_inverted_size_range_rejected() {
        let jitter = Jitter {
            size_range: [0.3, 0.1],
            ..Jitter::default()
        };
        assert!(jitter.validate().is_err());
    }

    #[test]
    fn test_trail_length_is_applied() {
        let emitter = Emitter::new(DEFAULT_RINGS.to_vec(), Palette::cosmic())
            .unwrap()
            .with_trail_length(32);
        for p in emitter.emit(&mut rng()) {
            assert_eq!(p.trail.capacity(), 32);
        }
    }
}
