//! Vizij Sprite Core (engine-agnostic)
//!
//! Frame-sequence playback for sprite-sheet animations: a [`Player`] advances
//! a frame index at a fixed rate over a [`FrameSource`] and renders through a
//! [`FrameSink`], with play/pause/stop, seeking, looping and yoyo playback.
//! Adapters (wasm, native render loops) supply the source, the sink and,
//! optionally, the frame scheduler and clock.

pub mod config;
pub mod error;
pub mod events;
pub mod frames;
pub mod player;
pub mod scheduler;
pub mod state;
pub mod timing;

// Re-exports for consumers (adapters)
pub use config::{PlayerConfig, DEFAULT_FRAME_RATE};
pub use error::SpriteError;
pub use events::{
    EventKind, EventListener, EventLog, ListenerId, LoggingListener, Notifier, PlayerEvent,
};
pub use frames::{FrameRect, FrameSink, FrameSource, GridSheet, RecordingSink};
pub use player::Player;
pub use scheduler::{Clock, FrameHandle, FrameQueue, FrameScheduler, ManualClock, SystemClock};
pub use state::PlaybackState;
pub use timing::FrameTimer;

/// Sprite player result type
pub type Result<T> = core::result::Result<T, SpriteError>;
