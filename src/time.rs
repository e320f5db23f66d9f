//! Frame clock and stepping policy.
//!
//! [`Time`] is the single source of truth for elapsed time, frame delta, frame
//! count and FPS. [`Stepping`] decides how much orbit progress a frame is worth.
//!
//! The original visualizer adds each particle's angular speed once per frame,
//! so it runs faster on faster displays. [`Stepping::PerFrame`] keeps that
//! behaviour and is the default. [`Stepping::Normalized`] scales each step by
//! the measured delta so the swirl turns at the same rate everywhere.
//!
//! ```ignore
//! let mut time = Time::new();
//! time.update();
//! let scale = Stepping::Normalized { reference_fps: 60.0 }.step_scale(&time);
//! ```

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Upper bound on the frames of progress one normalized update may cover.
///
/// Keeps a long stall (window drag, breakpoint) from teleporting particles.
pub const MAX_CATCH_UP_FRAMES: f32 = 4.0;

/// How much orbit progress one update represents.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Stepping {
    /// One angular step per rendered frame regardless of frame time.
    #[default]
    PerFrame,
    /// Scale the step by `delta · reference_fps`.
    Normalized {
        /// Frame rate the per-frame speeds were tuned for.
        reference_fps: f32,
    },
}

impl Stepping {
    /// Multiplier on angular speed for the frame `time` just measured.
    pub fn step_scale(&self, time: &Time) -> f32 {
        match *self {
            Stepping::PerFrame => {
                if time.is_paused() {
                    0.0
                } else {
                    1.0
                }
            }
            Stepping::Normalized { reference_fps } => {
                (time.delta() * reference_fps).clamp(0.0, MAX_CATCH_UP_FRAMES)
            }
        }
    }
}

/// Time tracking for the render loop.
#[derive(Debug)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    paused: bool,
    pause_elapsed: Duration,
    /// Fixed delta for headless or deterministic runs.
    fixed_delta: Option<f32>,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
            pause_elapsed: Duration::ZERO,
            fixed_delta: None,
        }
    }

    /// A clock that advances by exactly `delta` seconds per update.
    pub fn fixed(delta: f32) -> Self {
        let mut time = Self::new();
        time.set_fixed_delta(Some(delta));
        time
    }

    /// Update timing values. Call once per frame.
    ///
    /// Returns `(elapsed, delta)` in seconds.
    pub fn update(&mut self) -> (f32, f32) {
        let now = Instant::now();

        if self.paused {
            self.delta_secs = 0.0;
            return (self.elapsed_secs, self.delta_secs);
        }

        match self.fixed_delta {
            Some(delta) => {
                self.delta_secs = delta;
                self.elapsed_secs += delta;
            }
            None => {
                self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
                self.elapsed_secs =
                    (now.duration_since(self.start) - self.pause_elapsed).as_secs_f32();
            }
        }
        self.last_frame = now;
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    /// Seconds since start, excluding pauses.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Seconds since the previous update.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// While paused `delta()` is 0 and `elapsed()` stops.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            let now = Instant::now();
            self.pause_elapsed += now.duration_since(self.last_frame);
            self.last_frame = now;
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert!(!time.is_paused());
    }

    #[test]
    fn test_time_update() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let (elapsed, delta) = time.update();

        assert!(elapsed > 0.0);
        assert!(delta > 0.0);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_time_pause() {
        let mut time = Time::new();
        time.update();
        time.pause();

        let elapsed_before = time.elapsed();
        thread::sleep(Duration::from_millis(10));
        time.update();

        assert_eq!(time.elapsed(), elapsed_before);
        assert_eq!(time.delta(), 0.0);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_fixed_delta_accumulates() {
        let mut time = Time::fixed(0.5);
        time.update();
        time.update();
        assert_eq!(time.delta(), 0.5);
        assert_eq!(time.elapsed(), 1.0);
    }

    #[test]
    fn test_per_frame_ignores_delta() {
        let mut time = Time::fixed(0.25);
        time.update();
        assert_eq!(Stepping::PerFrame.step_scale(&time), 1.0);

        time.pause();
        assert_eq!(Stepping::PerFrame.step_scale(&time), 0.0);
    }

    #[test]
    fn test_normalized_scales_by_delta() {
        let mut time = Time::fixed(1.0 / 30.0);
        time.update();
        let scale = Stepping::Normalized { reference_fps: 60.0 }.step_scale(&time);
        assert!((scale - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_normalized_clamps_long_stalls() {
        let mut time = Time::fixed(10.0);
        time.update();
        let scale = Stepping::Normalized { reference_fps: 60.0 }.step_scale(&time);
        assert_eq!(scale, MAX_CATCH_UP_FRAMES);
    }
}
