//! Configuration for the sprite player

use serde::{Deserialize, Serialize};

use crate::error::SpriteError;

/// Playback rate used when none is configured.
pub const DEFAULT_FRAME_RATE: f64 = 60.0;

/// Options recognised by [`crate::Player`]. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Disable internal scheduling; the host drives `tick` with elapsed time.
    #[serde(alias = "manualUpdate")]
    pub manual_update: bool,
    /// Target playback rate in frames per second.
    #[serde(alias = "frameRate")]
    pub frame_rate: f64,
    /// Restart after the last frame instead of pausing.
    #[serde(rename = "loop")]
    pub loop_playback: bool,
    /// Reverse direction on every loop restart. Only meaningful with `loop`.
    pub yoyo: bool,
    /// Play only the first `frame_count` frames of the source.
    #[serde(alias = "frameCount", alias = "numFrames")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_count: Option<usize>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            manual_update: false,
            frame_rate: DEFAULT_FRAME_RATE,
            loop_playback: false,
            yoyo: false,
            frame_count: None,
        }
    }
}

impl PlayerConfig {
    /// Parse a JSON options object, e.g. `{"frameRate": 12, "loop": true}`.
    pub fn from_json(json: &str) -> Result<Self, SpriteError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), SpriteError> {
        if self.frame_rate <= 0.0 || !self.frame_rate.is_finite() {
            return Err(SpriteError::InvalidFrameRate {
                frame_rate: self.frame_rate,
            });
        }
        if let Some(0) = self.frame_count {
            return Err(SpriteError::InvalidFrameCount { frame_count: 0 });
        }
        Ok(())
    }

    /// Resolve the number of frames to play against what the source offers.
    pub fn resolve_frame_count(&self, available: usize) -> Result<usize, SpriteError> {
        let frame_count = self.frame_count.unwrap_or(available);
        if frame_count == 0 {
            return Err(SpriteError::InvalidFrameCount { frame_count });
        }
        if frame_count > available {
            return Err(SpriteError::FrameCountExceedsSource {
                requested: frame_count,
                available,
            });
        }
        Ok(frame_count)
    }

    /// Milliseconds between two frames at the configured rate.
    #[inline]
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.frame_rate
    }

    #[inline]
    pub fn with_manual_update(mut self) -> Self {
        self.manual_update = true;
        self
    }

    #[inline]
    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    #[inline]
    pub fn with_loop(mut self) -> Self {
        self.loop_playback = true;
        self
    }

    /// Enable yoyo playback. Implies looping.
    #[inline]
    pub fn with_yoyo(mut self) -> Self {
        self.loop_playback = true;
        self.yoyo = true;
        self
    }

    #[inline]
    pub fn with_frame_count(mut self, frame_count: usize) -> Self {
        self.frame_count = Some(frame_count);
        self
    }
}
