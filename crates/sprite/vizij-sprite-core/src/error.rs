//! Error types for the sprite player

use serde::{Deserialize, Serialize};

/// Errors raised while building or driving a sprite player.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SpriteError {
    /// Frame rate must be positive and finite
    #[error("Invalid frame rate: {frame_rate}")]
    InvalidFrameRate { frame_rate: f64 },

    /// Frame count must be at least one
    #[error("Invalid frame count: {frame_count}")]
    InvalidFrameCount { frame_count: usize },

    /// Sprite-sheet cells must have a non-zero size
    #[error("Invalid frame size: {width}x{height}")]
    InvalidFrameSize { width: u32, height: u32 },

    /// Sprite-sheet grid has more cells than can be indexed
    #[error("Sprite sheet grid of {columns}x{rows} cells is too large")]
    GridTooLarge { columns: u32, rows: u32 },

    /// Configured frame count is larger than what the source provides
    #[error("Frame count {requested} exceeds the {available} frames provided by the source")]
    FrameCountExceedsSource { requested: usize, available: usize },

    /// Manual players must be given the elapsed time explicitly
    #[error("Elapsed time is required when manual update is enabled")]
    MissingElapsed,

    /// Elapsed time must be non-negative and finite
    #[error("Invalid elapsed time: {elapsed_ms}ms")]
    InvalidElapsed { elapsed_ms: f64 },

    /// The source has no descriptor at the given index
    #[error("Frame not found: {index}")]
    FrameNotFound { index: usize },

    /// The sink failed to render a frame
    #[error("Failed to render frame {frame}: {reason}")]
    Render { frame: usize, reason: String },

    /// Configuration could not be parsed
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl SpriteError {
    /// Build a render failure for sinks. The frame index is filled in by the player.
    pub fn render(reason: impl Into<String>) -> Self {
        Self::Render {
            frame: 0,
            reason: reason.into(),
        }
    }

    /// Errors a host can recover from by carrying on ticking.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Render { .. } | Self::InvalidElapsed { .. } | Self::MissingElapsed
        )
    }

    /// Error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidFrameRate { .. }
            | Self::InvalidFrameCount { .. }
            | Self::InvalidFrameSize { .. }
            | Self::FrameCountExceedsSource { .. } => "config",
            Self::MissingElapsed | Self::InvalidElapsed { .. } => "timing",
            Self::FrameNotFound { .. } | Self::GridTooLarge { .. } => "source",
            Self::Render { .. } => "render",
            Self::Serialization { .. } => "serialization",
        }
    }

    pub(crate) fn at_frame(self, index: usize) -> Self {
        match self {
            Self::Render { reason, .. } => Self::Render {
                frame: index,
                reason,
            },
            other => other,
        }
    }
}

impl From<serde_json::Error> for SpriteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
