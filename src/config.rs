//! Visualizer configuration.
//!
//! A [`SwirlConfig`] collects everything needed to build a swirl: the ring
//! layout, palette, jitter, trail length, stepping policy, backdrop and window
//! settings. It serializes to JSON so a layout can be tweaked without a rebuild.
//! Every field defaults to the stock cosmic swirl (six rings, nine colours,
//! 1500-point trails), so a config file only needs to name what it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backdrop::BackdropConfig;
use crate::emitter::{Emitter, Jitter, Ring, DEFAULT_RINGS};
use crate::error::{Result, SwirlError};
use crate::time::Stepping;
use crate::trail::MAX_TRAIL_LENGTH;
use crate::visuals::{BlendMode, Palette, BACKGROUND_CENTER, BACKGROUND_EDGE, COSMIC_COLORS};

/// Window and camera settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Camera distance from the orbit plane.
    pub camera_distance: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub background_center: String,
    pub background_edge: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            title: "Cosmic Swirl".to_string(),
            width: 1280,
            height: 720,
            camera_distance: 5.0,
            fov_degrees: 75.0,
            background_center: BACKGROUND_CENTER.to_string(),
            background_edge: BACKGROUND_EDGE.to_string(),
        }
    }
}

/// Full configuration of the visualizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwirlConfig {
    pub rings: Vec<Ring>,
    /// `#RRGGBB` particle colours.
    pub palette: Vec<String>,
    pub jitter: Jitter,
    pub trail_length: usize,
    /// Line opacity applied on top of the per-point fade.
    pub trail_opacity: f32,
    pub blend_mode: BlendMode,
    pub stepping: Stepping,
    pub backdrop: BackdropConfig,
    pub view: ViewConfig,
    /// Seed for the particle layout. Random when absent.
    pub seed: Option<u64>,
}

impl Default for SwirlConfig {
    fn default() -> Self {
        Self {
            rings: DEFAULT_RINGS.to_vec(),
            palette: COSMIC_COLORS.iter().map(|c| c.to_string()).collect(),
            jitter: Jitter::default(),
            trail_length: MAX_TRAIL_LENGTH,
            trail_opacity: 0.7,
            blend_mode: BlendMode::Additive,
            stepping: Stepping::PerFrame,
            backdrop: BackdropConfig::default(),
            view: ViewConfig::default(),
            seed: None,
        }
    }
}

impl SwirlConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config: SwirlConfig = serde_json::from_str(&json)?;
        config.validate()?;
        info!(path = %path.display(), rings = config.rings.len(), "loaded swirl config");
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every value that would otherwise fail later or render garbage.
    pub fn validate(&self) -> Result<()> {
        if self.rings.is_empty() {
            return Err(SwirlError::Config("at least one ring is required".into()));
        }
        for (index, ring) in self.rings.iter().enumerate() {
            ring.validate(index)?;
        }
        self.jitter.validate()?;
        self.palette()?;

        if self.trail_length == 0 || self.trail_length > MAX_TRAIL_LENGTH {
            return Err(SwirlError::Config(format!(
                "trail length {} must be in 1..={MAX_TRAIL_LENGTH}",
                self.trail_length
            )));
        }
        if !(0.0..=1.0).contains(&self.trail_opacity) {
            return Err(SwirlError::Config("trail opacity must be in 0..=1".into()));
        }
        if let Stepping::Normalized { reference_fps } = self.stepping {
            if !reference_fps.is_finite() || reference_fps <= 0.0 {
                return Err(SwirlError::Config("reference fps must be positive".into()));
            }
        }
        self.backdrop.validate()?;
        if self.view.camera_distance <= 0.0 || !(1.0..179.0).contains(&self.view.fov_degrees) {
            return Err(SwirlError::Config("camera distance or field of view out of range".into()));
        }
        Ok(())
    }

    pub fn palette(&self) -> Result<Palette> {
        Palette::from_hex(self.palette.as_slice())
    }

    /// Build the emitter described by this config.
    pub fn emitter(&self) -> Result<Emitter> {
        Ok(Emitter::new(self.rings.clone(), self.palette()?)?
            .with_jitter(self.jitter)?
            .with_trail_length(self.trail_length))
    }
}
