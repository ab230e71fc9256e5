//! Frame timing and delta time.
//!
//! [`Time`] is advanced by the [`Game`](crate::game::Game) once per frame with
//! the delta reported by the [`Platform`](crate::platform::Platform). Systems
//! receive the delta directly; `Time` keeps the running totals.

use std::time::Duration;

/// Frame timing, advanced once per frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Time {
    /// Duration of the previous frame.
    delta: Duration,
    /// Total time across all frames so far.
    elapsed: Duration,
    frame_count: u64,
}

impl Time {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame that took `delta_secs` seconds.
    ///
    /// Negative or non-finite deltas are treated as zero.
    pub fn advance(&mut self, delta_secs: f32) {
        let secs = if delta_secs.is_finite() && delta_secs > 0.0 {
            delta_secs
        } else {
            0.0
        };
        self.delta = Duration::from_secs_f32(secs);
        self.elapsed += self.delta;
        self.frame_count += 1;
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Delta time in seconds (f32), the most common way to use it.
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Number of frames advanced so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Estimated FPS based on the last frame's delta.
    pub fn fps(&self) -> f32 {
        if self.delta.as_secs_f32() > 0.0 {
            1.0 / self.delta.as_secs_f32()
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates() {
        let mut time = Time::new();
        time.advance(0.5);
        time.advance(0.25);
        assert_eq!(time.frame_count(), 2);
        assert!((time.elapsed_secs() - 0.75).abs() < 1e-6);
        assert!((time.fps() - 4.0).abs() < 1e-3);
    }

    #[test]
    fn bad_delta_counts_as_zero() {
        let mut time = Time::new();
        time.advance(-1.0);
        time.advance(f32::NAN);
        assert_eq!(time.frame_count(), 2);
        assert_eq!(time.elapsed(), Duration::ZERO);
        assert_eq!(time.fps(), 0.0);
    }
}
