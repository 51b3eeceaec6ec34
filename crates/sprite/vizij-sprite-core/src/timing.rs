//! Frame-rate limiting.
//!
//! `FrameTimer` accumulates elapsed time and reports when a frame boundary
//! has been crossed. Whole intervals are consumed and the remainder is carried
//! into the next step, so the phase of the boundaries never drifts no matter
//! how irregularly the host calls in.

use serde::{Deserialize, Serialize};

use crate::error::SpriteError;

/// Slack for float error when comparing against the interval.
const EPSILON_MS: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameTimer {
    interval_ms: f64,
    /// Time since the last frame boundary (always < interval_ms between calls).
    accumulated_ms: f64,
    /// Clock reading of the previous evaluation; `None` until the first one.
    last_observed_ms: Option<f64>,
}

impl FrameTimer {
    pub fn new(frame_rate: f64) -> Result<Self, SpriteError> {
        if frame_rate <= 0.0 || !frame_rate.is_finite() {
            return Err(SpriteError::InvalidFrameRate { frame_rate });
        }
        Ok(Self {
            interval_ms: 1000.0 / frame_rate,
            accumulated_ms: 0.0,
            last_observed_ms: None,
        })
    }

    #[inline]
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    #[inline]
    pub fn accumulated_ms(&self) -> f64 {
        self.accumulated_ms
    }

    /// Milliseconds since the previous observation. The first observation
    /// after construction or [`FrameTimer::rebase`] returns zero.
    pub fn observe(&mut self, now_ms: f64) -> f64 {
        let delta = self
            .last_observed_ms
            .map_or(0.0, |last| (now_ms - last).max(0.0));
        self.last_observed_ms = Some(now_ms);
        delta
    }

    /// Add `elapsed_ms` and consume every whole interval now available.
    /// Returns how many intervals were consumed; zero means no boundary yet.
    pub fn accumulate(&mut self, elapsed_ms: f64) -> u64 {
        self.accumulated_ms += elapsed_ms;
        if self.accumulated_ms + EPSILON_MS < self.interval_ms {
            return 0;
        }

        let mut intervals = (self.accumulated_ms / self.interval_ms).floor();
        let mut remainder = self.accumulated_ms - intervals * self.interval_ms;
        if remainder + EPSILON_MS >= self.interval_ms {
            intervals += 1.0;
            remainder = 0.0;
        }
        self.accumulated_ms = remainder.max(0.0);
        intervals.max(1.0) as u64
    }

    /// Forget the last clock reading so a pause is not counted as elapsed time.
    pub fn rebase(&mut self) {
        self.last_observed_ms = None;
    }

    /// Drop any carried time and the last clock reading.
    pub fn reset(&mut self) {
        self.accumulated_ms = 0.0;
        self.last_observed_ms = None;
    }
}
