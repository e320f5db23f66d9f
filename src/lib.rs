//! # cosmic-swirl
//!
//! Orbiting particles with long fading trails, the "cosmic swirl" behind a
//! voice assistant's microphone button.
//!
//! Particles are laid out on concentric rings by an [`Emitter`], move along
//! their circles one angular step per frame, and leave a trail of up to
//! [`MAX_TRAIL_LENGTH`] points whose opacity falls off from the newest point to
//! the oldest. A [`VoiceMirror`] turns voice SDK callbacks into two flags,
//! listening and speaking, that speed the swirl up and make it pulse.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cosmic_swirl::prelude::*;
//! use rand::SeedableRng;
//!
//! let config = SwirlConfig::default();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let mut swirl = Swirl::new(&config, &mut rng)?;
//!
//! let mut time = Time::fixed(1.0 / 60.0);
//! for _ in 0..120 {
//!     time.update();
//!     swirl.frame(&time);
//! }
//! let snapshot = swirl.snapshot();
//! ```
//!
//! ## Voice flags
//!
//! ```ignore
//! let mut mirror = VoiceMirror::new();
//! let sub = mirror.subscribe();
//! mirror.handle(VoiceEvent::StartRequested);
//! mirror.handle(VoiceEvent::CallStart);
//! swirl.sync(&sub); // now listening
//! ```
//!
//! Flags only change speed and brightness. Angles and trails carry on
//! uninterrupted.
//!
//! ## Rendering
//!
//! [`window::run`] opens a winit window and draws each [`FrameSnapshot`] with
//! wgpu. Everything before that point runs without a GPU, which is how the
//! tests and the headless mode of the binary drive the engine.

pub mod backdrop;
pub mod config;
pub mod emitter;
pub mod error;
pub mod gpu;
pub mod orbit;
pub mod particle;
pub mod shader;
pub mod swirl;
pub mod time;
pub mod trail;
pub mod visuals;
pub mod voice;
pub mod window;

pub use backdrop::{Backdrop, BackdropConfig};
pub use config::{SwirlConfig, ViewConfig};
pub use emitter::{Emitter, Jitter, Ring, DEFAULT_RINGS};
pub use error::{GpuError, Result, RunError, SwirlError};
pub use glam::Vec3;
pub use particle::{Particle, ParticleInstance};
pub use swirl::{FrameSnapshot, Swirl, TrailStrip};
pub use time::{Stepping, Time};
pub use trail::{fade_alpha, Trail, TrailVertex, MAX_TRAIL_LENGTH};
pub use visuals::{BlendMode, Modulation, Palette};
pub use voice::{Role, Subscription, VisualFlags, VoiceEvent, VoiceMirror, VoiceState};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use cosmic_swirl::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backdrop::BackdropConfig;
    pub use crate::config::SwirlConfig;
    pub use crate::emitter::{Emitter, Jitter, Ring};
    pub use crate::swirl::{FrameSnapshot, Swirl};
    pub use crate::time::{Stepping, Time};
    pub use crate::trail::{Trail, MAX_TRAIL_LENGTH};
    pub use crate::visuals::{BlendMode, Palette};
    pub use crate::voice::{VisualFlags, VoiceEvent, VoiceMirror};
    pub use crate::Vec3;
}
