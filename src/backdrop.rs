//! Spiral-arm orb field and dust motes drawn behind the swirl.
//!
//! Layout is generated once in pixel space and mapped to scene units with
//! `pixels_per_unit`. Animation is driven by elapsed seconds rather than frame
//! count: the whole orb field turns once every 150 s (120 s during a call),
//! orbs pulse in size, and dust twinkles slowly.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SwirlError};
use crate::particle::ParticleInstance;
use crate::visuals::{parse_hex, Palette};
use crate::voice::VisualFlags;

const ROTATION_PERIOD_IDLE: f32 = 150.0;
const ROTATION_PERIOD_LISTENING: f32 = 120.0;
const DUST_COLOR: &str = "#4FC3F7";

/// Upper bounds keeping orb ids and buffer sizes well inside `u32`.
pub const MAX_ARMS: u32 = 12;
pub const MAX_ORBS_PER_ARM: u32 = 100;
pub const MAX_DUST: u32 = 5000;

/// Backdrop generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropConfig {
    pub arms: u32,
    pub orbs_per_arm: u32,
    /// Angle added per orb along an arm, radians.
    pub spiral_tightness: f32,
    pub dust_count: u32,
    /// Pixel to scene-unit conversion.
    pub pixels_per_unit: f32,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            arms: 3,
            orbs_per_arm: 45,
            spiral_tightness: 0.25,
            dust_count: 15,
            pixels_per_unit: 400.0,
        }
    }
}

impl BackdropConfig {
    pub fn validate(&self) -> Result<()> {
        if self.arms > MAX_ARMS {
            return Err(SwirlError::Config(format!("backdrop arms {} exceeds {MAX_ARMS}", self.arms)));
        }
        if self.orbs_per_arm > MAX_ORBS_PER_ARM {
            return Err(SwirlError::Config(format!(
                "orbs per arm {} exceeds {MAX_ORBS_PER_ARM}",
                self.orbs_per_arm
            )));
        }
        if self.dust_count > MAX_DUST {
            return Err(SwirlError::Config(format!("dust count {} exceeds {MAX_DUST}", self.dust_count)));
        }
        if !self.spiral_tightness.is_finite() {
            return Err(SwirlError::Config("spiral tightness must be finite".into()));
        }
        if !self.pixels_per_unit.is_finite() || self.pixels_per_unit <= 0.0 {
            return Err(SwirlError::Config("pixels per unit must be positive".into()));
        }
        Ok(())
    }
}

/// A glowing orb on one of the spiral arms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orb {
    pub id: u32,
    pub arm: u32,
    /// Position in pixels relative to the centre, before rotation.
    pub offset: Vec2,
    /// Diameter in pixels.
    pub size: f32,
    /// Phase delay in seconds.
    pub delay: f32,
    pub distance: f32,
    pub color: Vec3,
    /// Opacity shown until the orb's pulse starts.
    pub opacity: f32,
}

/// A faint drifting speck.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dust {
    pub offset: Vec2,
    pub size: f32,
    pub delay: f32,
    /// Twinkle period in seconds.
    pub period: f32,
}

#[derive(Debug, Clone)]
pub struct Backdrop {
    orbs: Vec<Orb>,
    dust: Vec<Dust>,
    pixels_per_unit: f32,
    rotation: f32,
    dust_color: Vec3,
}

impl Backdrop {
    pub fn generate<R: Rng + ?Sized>(config: &BackdropConfig, rng: &mut R) -> Self {
        let palette = Palette::backdrop();
        let arm_offset = TAU / config.arms.max(1) as f32;
        let capacity = config.arms.min(MAX_ARMS) * config.orbs_per_arm.min(MAX_ORBS_PER_ARM);
        let mut orbs = Vec::with_capacity(capacity as usize);

        for arm in 0..config.arms {
            let arm_angle = arm as f32 * arm_offset;
            for i in 0..config.orbs_per_arm {
                let fi = i as f32;
                let distance = 20.0 + fi.powf(1.4) * 8.0;
                let angle = arm_angle + fi * config.spiral_tightness + fi.powf(0.7) * 0.1;

                let scatter = rng.gen_range(2.0..10.0);
                let scatter_angle = rng.gen_range(0.0..TAU);
                let offset = Vec2::from_angle(angle) * distance
                    + Vec2::from_angle(scatter_angle) * scatter;

                let id = arm.saturating_mul(MAX_ORBS_PER_ARM).saturating_add(i);
                let base_opacity = (1.0 - arm as f32 * 0.15).max(0.3);
                orbs.push(Orb {
                    id,
                    arm,
                    offset,
                    size: (4.0 - distance / 200.0).max(1.5),
                    delay: rng.gen_range(0.0..3.0),
                    distance,
                    color: palette.cycle(id as usize + arm as usize * 2),
                    opacity: base_opacity + rng.gen_range(0.0..0.2),
                });
            }
        }

        let dust = (0..config.dust_count)
            .map(|_| Dust {
                offset: Vec2::new(rng.gen_range(-1000.0..1000.0), rng.gen_range(-1000.0..1000.0)),
                size: rng.gen_range(1.0..2.5),
                delay: rng.gen_range(0.0..12.0),
                period: rng.gen_range(8.0..12.0),
            })
            .collect();

        Self {
            orbs,
            dust,
            pixels_per_unit: config.pixels_per_unit.max(f32::EPSILON),
            rotation: 0.0,
            dust_color: parse_hex(DUST_COLOR).unwrap_or(Vec3::ONE),
        }
    }

    pub fn orbs(&self) -> &[Orb] {
        &self.orbs
    }

    pub fn dust(&self) -> &[Dust] {
        &self.dust
    }

    /// Current field rotation in radians.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Turn the field by `delta` seconds' worth of rotation.
    pub fn advance(&mut self, delta: f32, flags: VisualFlags) {
        let period = if flags.listening {
            ROTATION_PERIOD_LISTENING
        } else {
            ROTATION_PERIOD_IDLE
        };
        self.rotation = (self.rotation + delta * TAU / period) % TAU;
    }

    /// Point sprites for the orbs and dust at `elapsed` seconds.
    pub fn instances(&self, elapsed: f32, flags: VisualFlags) -> Vec<ParticleInstance> {
        let scale = 1.0 / self.pixels_per_unit;
        let rotation = Vec2::from_angle(self.rotation);
        let peak = if flags.listening { 1.3 } else { 1.2 };

        let orbs = self.orbs.iter().map(|orb| {
            let period = if flags.listening { 2.5 } else { 3.0 + orb.delay };
            // 0 at the start of a cycle, 1 at its midpoint.
            let wave = 0.5 - 0.5 * ((elapsed - orb.delay) * TAU / period).cos();
            let pulse = 0.8 + (peak - 0.8) * wave;
            let wobble = Vec2::new((orb.id as f32).sin(), (orb.id as f32).cos()) * 5.0 * wave;
            let pos = rotation.rotate(orb.offset + wobble) * scale;

            ParticleInstance {
                position: [pos.x, pos.y, -0.5],
                // Glow reaches twice the orb size.
                size: orb.size * pulse * scale,
                color: orb.color.to_array(),
                opacity: if elapsed < orb.delay {
                    orb.opacity.min(1.0)
                } else {
                    0.6 + 0.4 * wave
                },
            }
        });

        let dust = self.dust.iter().map(|d| {
            let wave = 0.5 - 0.5 * ((elapsed - d.delay) * TAU / d.period).cos();
            let pos = d.offset * scale;
            ParticleInstance {
                position: [pos.x, pos.y, -0.6],
                size: d.size * (0.8 + 0.4 * wave) * 0.5 * scale,
                color: self.dust_color.to_array(),
                opacity: 0.05 + 0.1 * wave,
            }
        });

        orbs.chain(dust).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn backdrop() -> Backdrop {
        Backdrop::generate(&BackdropConfig::default(), &mut StdRng::seed_from_u64(11))
    }

    #[test]
    fn test_default_counts() {
        let b = backdrop();
        assert_eq!(b.orbs().len(), 135);
        assert_eq!(b.dust().len(), 15);
        assert_eq!(b.instances(0.0, VisualFlags::default()).len(), 150);
    }

    #[test]
    fn test_orb_sizes_and_opacity() {
        for orb in backdrop().orbs() {
            assert!(orb.size >= 1.5 && orb.size <= 4.0);
            assert!(orb.opacity >= 0.3 && orb.opacity < 1.2);
            assert!(orb.offset.length() <= orb.distance + 10.0);
        }
    }

    #[test]
    fn test_listening_rotates_faster() {
        let mut idle = backdrop();
        let mut live = backdrop();
        idle.advance(1.0, VisualFlags::default());
        live.advance(
            1.0,
            VisualFlags {
                listening: true,
                speaking: false,
            },
        );
        assert!(live.rotation() > idle.rotation());
        assert!((idle.rotation() - TAU / 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_orb_opacity_pulses_between_bounds() {
        let b = backdrop();
        let live = VisualFlags {
            listening: true,
            speaking: false,
        };
        for t in [3.0, 4.2, 9.9, 61.0] {
            for flags in [VisualFlags::default(), live] {
                for inst in &b.instances(t, flags)[..135] {
                    assert!(inst.opacity >= 0.6 - 1e-6 && inst.opacity <= 1.0 + 1e-6);
                }
            }
        }
        // Before its delay an orb keeps its base opacity.
        let waiting = b.orbs().iter().position(|o| o.delay > 0.0).unwrap();
        let inst = b.instances(0.0, VisualFlags::default())[waiting];
        assert_eq!(inst.opacity, b.orbs()[waiting].opacity.min(1.0));
    }

    #[test]
    fn test_validate_rejects_oversized_layouts() {
        BackdropConfig::default().validate().unwrap();
        for config in [
            BackdropConfig {
                arms: u32::MAX,
                ..BackdropConfig::default()
            },
            BackdropConfig {
                orbs_per_arm: u32::MAX,
                ..BackdropConfig::default()
            },
            BackdropConfig {
                dust_count: MAX_DUST + 1,
                ..BackdropConfig::default()
            },
            BackdropConfig {
                pixels_per_unit: 0.0,
                ..BackdropConfig::default()
            },
        ] {
            assert!(matches!(config.validate(), Err(SwirlError::Config(_))));
        }
    }

    #[test]
    fn test_dust_opacity_range() {
        let b = backdrop();
        for t in [0.0, 2.5, 7.0, 30.0] {
            for inst in &b.instances(t, VisualFlags::default())[135..] {
                assert!(inst.opacity >= 0.05 - 1e-6 && inst.opacity <= 0.15 + 1e-6);
            }
        }
    }
}
