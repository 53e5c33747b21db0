//! Converts wall-clock frame intervals into physics deltas.

use log::warn;
use std::time::{Duration, Instant};

/// Frame rate at which a delta of 1.0 equals one frame.
pub const REFERENCE_FRAME_RATE: f64 = 60.0;
/// Upper bound on the frame rate tick drivers run at.
pub const MAX_FRAME_RATE: u32 = 144;
/// Largest delta handed to the physics step (1/20 s).
pub const MAX_DELTA_FRAMES: f64 = 3.0;

/// Elapsed time expressed in reference frames.
pub fn frames_from_duration(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * REFERENCE_FRAME_RATE
}

/// Measures the delta between successive ticks.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_tick: Instant,
    max_delta: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            last_tick: start,
            max_delta: MAX_DELTA_FRAMES,
        }
    }

    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    /// Delta since the previous tick, capped to keep a stalled frame from
    /// launching entities through platforms.
    pub fn tick_at(&mut self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;

        let delta = frames_from_duration(elapsed);
        if delta > self.max_delta {
            warn!(
                "Large delta detected ({:.2} frames), capping to {:.2}",
                delta, self.max_delta
            );
            return self.max_delta;
        }
        delta
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_one_frame_is_unit_delta() {
        assert_approx_eq!(
            frames_from_duration(Duration::from_secs_f64(1.0 / 60.0)),
            1.0,
            1e-9
        );
    }

    #[test]
    fn test_tick_measures_elapsed() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);

        let delta = clock.tick_at(start + Duration::from_millis(25));
        assert_approx_eq!(delta, 1.5, 1e-9);

        let delta = clock.tick_at(start + Duration::from_millis(50));
        assert_approx_eq!(delta, 1.5, 1e-9);
    }

    #[test]
    fn test_large_delta_is_capped() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);

        let delta = clock.tick_at(start + Duration::from_secs(2));
        assert_eq!(delta, MAX_DELTA_FRAMES);
    }

    #[test]
    fn test_time_going_backwards_is_zero() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::starting_at(start);
        assert_eq!(clock.tick_at(start - Duration::from_millis(10)), 0.0);
    }
}
