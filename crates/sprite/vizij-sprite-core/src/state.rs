use serde::{Deserialize, Serialize};

/// Playback state of a sprite player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Not started, or stopped and rewound to the first frame
    Stopped,
    /// Advancing frames
    Playing,
    /// Halted by the host on the current frame
    Paused,
    /// Parked on the terminal frame after a non-looping sweep
    Ended,
}

impl PlaybackState {
    /// Get the name of this playback state
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Ended => "ended",
        }
    }

    /// Check if the player is actively playing
    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Check if the player can be resumed
    #[inline]
    pub fn can_resume(&self) -> bool {
        !self.is_playing()
    }

    /// Check if the player can be paused
    #[inline]
    pub fn can_pause(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Check if the player can be stopped
    #[inline]
    pub fn can_stop(&self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
