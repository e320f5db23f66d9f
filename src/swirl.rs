//! The swirl engine.
//!
//! [`Swirl`] owns the particle set, its trails and the backdrop. The host calls
//! [`Swirl::frame`] once per rendered frame; each call moves every particle
//! along its orbit and then records the new position into that particle's
//! trail. [`Swirl::snapshot`] hands back everything the renderer needs.
//!
//! Voice flags only feed [`Modulation`]; toggling them never touches angles or
//! trails.

use rand::Rng;
use tracing::{debug, info};

use crate::backdrop::{Backdrop, BackdropConfig};
use crate::config::SwirlConfig;
use crate::emitter::Emitter;
use crate::error::Result;
use crate::orbit;
use crate::particle::{Particle, ParticleInstance};
use crate::time::{Stepping, Time};
use crate::trail::TrailVertex;
use crate::visuals::Modulation;
use crate::voice::{Subscription, VisualFlags};

/// Sprite half-extent per unit of particle size. Matches a point diameter of
/// `size * 800 / depth` pixels in a 720 px tall viewport at 75° fov.
const POINT_SCALE: f32 = 0.85;

/// One particle's trail, newest point first, already limited to its draw range.
#[derive(Debug, Clone, Default)]
pub struct TrailStrip {
    pub vertices: Vec<TrailVertex>,
}

/// Renderable state for one frame.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub particles: Vec<ParticleInstance>,
    pub trails: Vec<TrailStrip>,
    pub backdrop: Vec<ParticleInstance>,
    pub modulation: Modulation,
}

/// Orbiting particles with fading trails.
#[derive(Debug)]
pub struct Swirl {
    particles: Vec<Particle>,
    backdrop: Backdrop,
    stepping: Stepping,
    flags: VisualFlags,
    modulation: Modulation,
    frames_elapsed: u64,
    elapsed: f32,
}

impl Swirl {
    /// Build a swirl from `config`, drawing all randomness from `rng`.
    pub fn new<R: Rng + ?Sized>(config: &SwirlConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let emitter = config.emitter()?;
        Ok(Self::from_emitter(&emitter, &config.backdrop, config.stepping, rng))
    }

    /// Build a swirl from an already validated emitter.
    pub fn from_emitter<R: Rng + ?Sized>(
        emitter: &Emitter,
        backdrop: &BackdropConfig,
        stepping: Stepping,
        rng: &mut R,
    ) -> Self {
        let particles = emitter.emit(rng);
        let backdrop = Backdrop::generate(backdrop, rng);
        info!(
            particles = particles.len(),
            rings = emitter.rings().len(),
            orbs = backdrop.orbs().len(),
            ?stepping,
            "swirl ready"
        );

        Self {
            particles,
            backdrop,
            stepping,
            flags: VisualFlags::default(),
            modulation: Modulation::NEUTRAL,
            frames_elapsed: 0,
            elapsed: 0.0,
        }
    }

    /// Advance one frame: orbit first, then trails.
    ///
    /// Does nothing while `time` is paused.
    pub fn frame(&mut self, time: &Time) {
        if time.is_paused() {
            return;
        }

        self.elapsed = time.elapsed();
        self.modulation = Modulation::from_flags(self.flags, self.elapsed);
        let step_scale = self.stepping.step_scale(time) * self.modulation.speed_scale;

        for particle in &mut self.particles {
            let position = orbit::step(particle, step_scale);
            particle.trail.record(position);
        }

        self.backdrop.advance(time.delta(), self.flags);
        self.frames_elapsed += 1;
    }

    /// Replace the voice flags.
    pub fn set_flags(&mut self, flags: VisualFlags) {
        if flags != self.flags {
            debug!(?flags, "visual flags changed");
            self.flags = flags;
            self.modulation = Modulation::from_flags(flags, self.elapsed);
        }
    }

    /// Pull the latest flags from a voice subscription. Returns whether any
    /// update was pending.
    pub fn sync(&mut self, subscription: &Subscription) -> bool {
        match subscription.latest() {
            Some(flags) => {
                self.set_flags(flags);
                true
            }
            None => false,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn backdrop(&self) -> &Backdrop {
        &self.backdrop
    }

    pub fn flags(&self) -> VisualFlags {
        self.flags
    }

    pub fn modulation(&self) -> Modulation {
        self.modulation
    }

    pub fn stepping(&self) -> Stepping {
        self.stepping
    }

    pub fn frames_elapsed(&self) -> u64 {
        self.frames_elapsed
    }

    /// Particle sprites with brightness applied.
    pub fn particle_instances(&self) -> Vec<ParticleInstance> {
        let brightness = self.modulation.brightness;
        self.particles
            .iter()
            .map(|p| ParticleInstance {
                position: p.position().to_array(),
                size: p.size() * POINT_SCALE,
                color: (p.color() * brightness).to_array(),
                opacity: 1.0,
            })
            .collect()
    }

    /// Renderable state for the current frame.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            particles: self.particle_instances(),
            trails: self
                .particles
                .iter()
                .map(|p| TrailStrip {
                    vertices: p.trail.faded_vertices(p.color()).collect(),
                })
                .collect(),
            backdrop: self.backdrop.instances(self.elapsed, self.flags),
            modulation: self.modulation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::Ring;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn swirl() -> Swirl {
        Swirl::new(&SwirlConfig::default(), &mut StdRng::seed_from_u64(3)).unwrap()
    }

    #[test]
    fn test_frame_records_after_moving() {
        let mut swirl = swirl();
        let before: Vec<f32> = swirl.particles().iter().map(|p| p.angle).collect();
        let mut time = Time::fixed(1.0 / 60.0);
        time.update();
        swirl.frame(&time);

        for (p, angle) in swirl.particles().iter().zip(before) {
            assert!((orbit::angular_delta(angle, p.angle) - p.angular_speed()).abs() < 1e-5);
            assert_eq!(p.trail.len(), 1);
            assert_eq!(p.trail.head(), Some(p.position()));
        }
        assert_eq!(swirl.frames_elapsed(), 1);
    }

    #[test]
    fn test_paused_frame_is_skipped() {
        let mut swirl = swirl();
        let mut time = Time::fixed(1.0 / 60.0);
        time.update();
        time.pause();
        swirl.frame(&time);
        assert_eq!(swirl.frames_elapsed(), 0);
        assert!(swirl.particles().iter().all(|p| p.trail.is_empty()));
    }

    #[test]
    fn test_listening_speeds_up_rotation() {
        let config = SwirlConfig {
            rings: vec![Ring::new(1.0, 1, 0.01)],
            ..SwirlConfig::default()
        };
        let mut swirl = Swirl::new(&config, &mut StdRng::seed_from_u64(5)).unwrap();
        swirl.set_flags(VisualFlags {
            listening: true,
            speaking: false,
        });
        let start = swirl.particles()[0].angle;
        let mut time = Time::fixed(1.0 / 60.0);
        time.update();
        swirl.frame(&time);
        let moved = orbit::angular_delta(start, swirl.particles()[0].angle).abs();
        assert!((moved - 0.0125).abs() < 1e-5);
    }

    #[test]
    fn test_particle_sprite_matches_point_size() {
        let swirl = swirl();
        // Half of `size * 800 / 5` pixels, converted to scene units at depth 5.
        let units_per_pixel = 2.0 * 5.0 * (75.0f32.to_radians() / 2.0).tan() / 720.0;
        for (p, inst) in swirl.particles().iter().zip(swirl.particle_instances()) {
            let expected = p.size() * 800.0 / 5.0 / 2.0 * units_per_pixel;
            assert!((inst.size - expected).abs() / expected < 0.01, "{} vs {expected}", inst.size);
        }
    }

    #[test]
    fn test_snapshot_shapes() {
        let mut swirl = swirl();
        let mut time = Time::fixed(1.0 / 60.0);
        for _ in 0..5 {
            time.update();
            swirl.frame(&time);
        }
        let snap = swirl.snapshot();
        assert_eq!(snap.particles.len(), 10);
        assert_eq!(snap.trails.len(), 10);
        assert!(snap.trails.iter().all(|t| t.vertices.len() == 5));
        assert_eq!(snap.backdrop.len(), 150);
    }
}
