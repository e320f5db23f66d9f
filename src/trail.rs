//! Per-particle position history with age-based fade.
//!
//! A [`Trail`] stores the most recent positions of one particle, newest first.
//! Every frame the engine records the particle's new position at the front and
//! the oldest entry falls off the back once the trail is full.
//!
//! Rendering walks the trail from head to tail. Entry `i` of a trail holding
//! `L` points fades with
//!
//! ```text
//! alpha(i) = max(0, 1 - i / L) ^ 0.3 * 1.1
//! ```
//!
//! which stays bright for most of the history and drops off sharply near the
//! tail. The colour of each vertex is the particle colour scaled by that alpha;
//! the renderer clamps the alpha itself into `0..=1`.

use std::collections::VecDeque;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Upper bound on the number of positions a trail keeps.
pub const MAX_TRAIL_LENGTH: usize = 1500;

const FADE_EXPONENT: f32 = 0.3;
const FADE_GAIN: f32 = 1.1;

/// Fade alpha for entry `index` in a trail of `len` points.
///
/// Returns 0 for an empty trail or an index past the end, so callers never
/// divide by zero.
#[inline]
pub fn fade_alpha(index: usize, len: usize) -> f32 {
    if len == 0 || index >= len {
        return 0.0;
    }
    let remaining = (1.0 - index as f32 / len as f32).max(0.0);
    remaining.powf(FADE_EXPONENT) * FADE_GAIN
}

/// One trail point as uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TrailVertex {
    pub position: [f32; 3],
    /// Fade alpha clamped into `0..=1`.
    pub alpha: f32,
    /// Particle colour scaled by the unclamped fade alpha.
    pub color: [f32; 3],
    pub _pad: f32,
}

/// Bounded, most-recent-first position history.
#[derive(Debug, Clone)]
pub struct Trail {
    points: VecDeque<Vec3>,
    capacity: usize,
}

impl Trail {
    /// A trail holding at most [`MAX_TRAIL_LENGTH`] points.
    pub fn new() -> Self {
        Self::with_capacity(MAX_TRAIL_LENGTH)
    }

    /// A trail holding at most `capacity` points, itself capped at
    /// [`MAX_TRAIL_LENGTH`].
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_TRAIL_LENGTH);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push `position` to the front, dropping the oldest point if full.
    pub fn record(&mut self, position: Vec3) {
        self.points.push_front(position);
        if self.points.len() > self.capacity {
            self.points.pop_back();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Newest point, if any.
    pub fn head(&self) -> Option<Vec3> {
        self.points.front().copied()
    }

    /// Oldest point still kept, if any.
    pub fn tail(&self) -> Option<Vec3> {
        self.points.back().copied()
    }

    /// Points from newest to oldest.
    pub fn points(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.points.iter().copied()
    }

    /// Number of points the renderer should draw.
    #[inline]
    pub fn draw_range(&self) -> usize {
        self.points.len().min(MAX_TRAIL_LENGTH)
    }

    /// Fade alpha of the point at `index`.
    #[inline]
    pub fn alpha_at(&self, index: usize) -> f32 {
        fade_alpha(index, self.points.len())
    }

    /// GPU vertices for this trail, newest first, limited to the draw range.
    pub fn faded_vertices(&self, color: Vec3) -> impl Iterator<Item = TrailVertex> + '_ {
        self.points
            .iter()
            .take(self.draw_range())
            .enumerate()
            .map(move |(i, p)| {
                let alpha = self.alpha_at(i);
                TrailVertex {
                    position: p.to_array(),
                    alpha: alpha.clamp(0.0, 1.0),
                    color: (color * alpha).to_array(),
                    _pad: 0.0,
                }
            })
    }
}

impl Default for Trail {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_guards_empty_trail() {
        assert_eq!(fade_alpha(0, 0), 0.0);
        assert_eq!(fade_alpha(5, 5), 0.0);
    }

    #[test]
    fn test_fade_head_is_gain() {
        assert!((fade_alpha(0, 1) - 1.1).abs() < 1e-6);
        assert!((fade_alpha(0, 1500) - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_fade_non_increasing() {
        let len = 1500;
        let mut prev = fade_alpha(0, len);
        for i in 1..len {
            let a = fade_alpha(i, len);
            assert!(a <= prev, "alpha rose at {i}: {a} > {prev}");
            assert!(a > 0.0);
            prev = a;
        }
    }

    #[test]
    fn test_fade_midpoint() {
        // (0.5)^0.3 * 1.1
        let expected = 0.5f32.powf(0.3) * 1.1;
        assert!((fade_alpha(50, 100) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_record_is_newest_first() {
        let mut trail = Trail::new();
        trail.record(Vec3::X);
        trail.record(Vec3::Y);
        assert_eq!(trail.head(), Some(Vec3::Y));
        assert_eq!(trail.tail(), Some(Vec3::X));
    }

    #[test]
    fn test_record_caps_length() {
        let mut trail = Trail::with_capacity(3);
        for i in 0..10 {
            trail.record(Vec3::splat(i as f32));
        }
        assert_eq!(trail.len(), 3);
        assert_eq!(trail.head(), Some(Vec3::splat(9.0)));
        assert_eq!(trail.tail(), Some(Vec3::splat(7.0)));
    }

    #[test]
    fn test_capacity_never_exceeds_max() {
        let trail = Trail::with_capacity(10_000);
        assert_eq!(trail.capacity(), MAX_TRAIL_LENGTH);
    }

    #[test]
    fn test_faded_vertices_clamp_alpha() {
        let mut trail = Trail::new();
        for i in 0..4 {
            trail.record(Vec3::new(i as f32, 0.0, 0.0));
        }
        let verts: Vec<_> = trail.faded_vertices(Vec3::ONE).collect();
        assert_eq!(verts.len(), 4);
        assert_eq!(verts[0].alpha, 1.0);
        assert!((verts[0].color[0] - 1.1).abs() < 1e-6);
        assert!(verts[3].alpha < verts[0].alpha);
        for (i, v) in verts.iter().enumerate() {
            assert!((v.color[0] - trail.alpha_at(i)).abs() < 1e-6);
        }
    }
}
