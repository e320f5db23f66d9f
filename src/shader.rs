//! WGSL sources and the uniform block they share.

use bytemuck::{Pod, Zeroable};

pub const BACKGROUND_SOURCE: &str = include_str!("shaders/background.wgsl");
pub const SPRITES_SOURCE: &str = include_str!("shaders/sprites.wgsl");
pub const TRAILS_SOURCE: &str = include_str!("shaders/trails.wgsl");

/// Uniforms bound at group 0, binding 0 in every pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    /// Background gradient centre, rgb + unused.
    pub center: [f32; 4],
    /// Background gradient edge, rgb + unused.
    pub edge: [f32; 4],
    /// Trail opacity, elapsed seconds, brightness, aspect ratio.
    pub params: [f32; 4],
}
