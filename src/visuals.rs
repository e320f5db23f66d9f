//! Colour palettes, blending, and flag-driven visual modulation.
//!
//! The orbiting particles draw their colour from a [`Palette`]; the backdrop
//! uses its own warm/cool set. [`Modulation`] turns the voice [`VisualFlags`]
//! into secondary parameters (rotation speed, brightness) that the engine and
//! renderer apply on top of the orbit and trail state, never inside it.
//!
//! # Example
//!
//! ```ignore
//! let palette = Palette::from_hex(&["#FF69B4", "#00BFFF"])?;
//! let modulation = Modulation::from_flags(VisualFlags::default(), 0.0);
//! assert_eq!(modulation.speed_scale, 1.0);
//! ```

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::error::{Result, SwirlError};
use crate::voice::VisualFlags;

/// Default particle colours: hot pink, deep sky blue, white, gold, tomato,
/// medium purple, spring green, deep pink, dark turquoise.
pub const COSMIC_COLORS: [&str; 9] = [
    "#FF69B4", "#00BFFF", "#FFFFFF", "#FFD700", "#FF6347", "#9370DB", "#00FF7F", "#FF1493",
    "#00CED1",
];

/// Backdrop orb colours: warm orange, pink, yellow, then cool cyan, teal, mint.
pub const BACKDROP_COLORS: [&str; 6] = [
    "#FF8A65", "#FF7B8E", "#FFD54F", "#4FC3F7", "#26C6DA", "#66BB6A",
];

/// Radial background gradient, centre then edge.
pub const BACKGROUND_CENTER: &str = "#5C7C8C";
pub const BACKGROUND_EDGE: &str = "#345678";

/// Rotation speed multiplier while a call is live (150 s period down to 120 s).
pub const LISTENING_SPEED_SCALE: f32 = 150.0 / 120.0;

/// Parse a `#RRGGBB` string into linear 0..1 RGB.
pub fn parse_hex(hex: &str) -> Result<Vec3> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(SwirlError::InvalidColor(hex.to_string()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map(|v| v as f32 / 255.0)
            .map_err(|_| SwirlError::InvalidColor(hex.to_string()))
    };
    Ok(Vec3::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// A fixed set of saturated colours particles are drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Vec3>,
}

impl Palette {
    /// Build a palette from explicit RGB colours. Fails on an empty list.
    pub fn new(colors: Vec<Vec3>) -> Result<Self> {
        if colors.is_empty() {
            return Err(SwirlError::Config("palette must contain at least one colour".into()));
        }
        Ok(Self { colors })
    }

    /// Build a palette from `#RRGGBB` strings.
    pub fn from_hex<S: AsRef<str>>(hex: &[S]) -> Result<Self> {
        let colors = hex
            .iter()
            .map(|h| parse_hex(h.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(colors)
    }

    /// The nine-colour default palette.
    pub fn cosmic() -> Self {
        Self::from_hex(&COSMIC_COLORS).unwrap_or_else(|_| Self { colors: vec![Vec3::ONE] })
    }

    /// The six backdrop colours.
    pub fn backdrop() -> Self {
        Self::from_hex(&BACKDROP_COLORS).unwrap_or_else(|_| Self { colors: vec![Vec3::ONE] })
    }

    /// Uniformly pick one colour.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        self.colors[rng.gen_range(0..self.colors.len())]
    }

    /// Colour at `index`, wrapping around the palette.
    pub fn cycle(&self, index: usize) -> Vec3 {
        self.colors[index % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::cosmic()
    }
}

/// Blend mode for particle and trail rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Standard alpha blending.
    Alpha,

    /// Colours add up, overlapping trails glow. The visualizer's default.
    #[default]
    Additive,
}

impl BlendMode {
    /// Convert to the wgpu blend state.
    pub fn to_blend_state(self) -> wgpu::BlendState {
        match self {
            BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
            BlendMode::Additive => wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            },
        }
    }
}

/// Secondary animation parameters derived from the voice flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Modulation {
    /// Multiplier on each particle's angular step.
    pub speed_scale: f32,
    /// Multiplier on particle and background brightness.
    pub brightness: f32,
}

impl Modulation {
    /// No modulation at all.
    pub const NEUTRAL: Modulation = Modulation {
        speed_scale: 1.0,
        brightness: 1.0,
    };

    /// Derive modulation for the given flags at `elapsed` seconds.
    ///
    /// Idle breathes slowly around 1.0 over 20 s, a live call lifts the base to
    /// 1.12 with a 12 s breathe, and speech adds a one-second pulse.
    pub fn from_flags(flags: VisualFlags, elapsed: f32) -> Self {
        let speed_scale = if flags.listening { LISTENING_SPEED_SCALE } else { 1.0 };

        let mut brightness = if flags.listening {
            1.12 + 0.05 * (elapsed * TAU / 12.0).sin()
        } else {
            1.0 + 0.06 * (elapsed * TAU / 20.0).sin()
        };
        if flags.speaking {
            brightness *= 1.0 + 0.06 * (elapsed * TAU).sin().abs();
        }

        Self {
            speed_scale,
            brightness,
        }
    }
}

impl Default for Modulation {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse_hex() {
        let c = parse_hex("#FF8000").unwrap();
        assert_eq!(c.x, 1.0);
        assert!((c.y - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.z, 0.0);

        assert!(parse_hex("#FFF").is_err());
        assert!(parse_hex("#GG0000").is_err());
        assert!(parse_hex("00ff00").is_ok());
    }

    #[test]
    fn test_cosmic_palette_has_nine_colors() {
        let palette = Palette::cosmic();
        assert_eq!(palette.len(), 9);
        assert_eq!(palette.colors()[2], Vec3::ONE);
    }

    #[test]
    fn test_empty_palette_rejected() {
        assert!(Palette::new(Vec::new()).is_err());
        let empty: [&str; 0] = [];
        assert!(Palette::from_hex(&empty).is_err());
    }

    #[test]
    fn test_pick_stays_in_palette() {
        let palette = Palette::cosmic();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let c = palette.pick(&mut rng);
            assert!(palette.colors().contains(&c));
        }
    }

    #[test]
    fn test_modulation_speed() {
        let idle = Modulation::from_flags(VisualFlags::default(), 3.0);
        assert_eq!(idle.speed_scale, 1.0);

        let live = Modulation::from_flags(
            VisualFlags {
                listening: true,
                speaking: false,
            },
            3.0,
        );
        assert!((live.speed_scale - 1.25).abs() < 1e-6);
        assert!(live.brightness > 1.0);
    }

    #[test]
    fn test_speaking_never_dims() {
        let base = VisualFlags {
            listening: true,
            speaking: false,
        };
        let speaking = VisualFlags {
            listening: true,
            speaking: true,
        };
        for step in 0..50 {
            let t = step as f32 * 0.13;
            let a = Modulation::from_flags(base, t).brightness;
            let b = Modulation::from_flags(speaking, t).brightness;
            assert!(b >= a);
        }
    }
}
