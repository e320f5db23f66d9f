//! Error types for cosmic-swirl.
//!
//! Configuration and ring validation fail fast with [`SwirlError`]. GPU setup
//! failures surface as [`GpuError`], and [`RunError`] wraps everything that can
//! stop the windowed visualizer.

use thiserror::Error;

/// Result alias for fallible engine operations.
pub type Result<T> = std::result::Result<T, SwirlError>;

/// Errors raised while building or configuring the particle engine.
#[derive(Debug, Error)]
pub enum SwirlError {
    /// A ring descriptor failed validation.
    #[error("invalid ring #{index}: {reason}")]
    InvalidRing {
        /// Position of the ring in the configured list.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A configuration value is out of range.
    #[error("configuration error: {0}")]
    Config(String),

    /// A palette entry could not be parsed as `#RRGGBB`.
    #[error("invalid colour {0:?}, expected #RRGGBB")]
    InvalidColor(String),

    /// Failed to read or write a configuration file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file was not valid JSON for [`crate::SwirlConfig`].
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),

    /// The surface reported no usable texture formats.
    #[error("surface is incompatible with the selected adapter")]
    IncompatibleSurface,
}

/// Errors that can stop the windowed visualizer.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to create event loop.
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// Failed to create window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),

    /// Engine construction failed.
    #[error(transparent)]
    Swirl(#[from] SwirlError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_ring_message_names_index() {
        let err = SwirlError::InvalidRing {
            index: 3,
            reason: "radius must be positive".into(),
        };
        assert_eq!(err.to_string(), "invalid ring #3: radius must be positive");
    }

    #[test]
    fn test_run_error_is_transparent_for_swirl_errors() {
        let err: RunError = SwirlError::Config("empty palette".into()).into();
        assert_eq!(err.to_string(), "configuration error: empty palette");
    }
}
