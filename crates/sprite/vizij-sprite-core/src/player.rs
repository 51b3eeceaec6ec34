//! Sprite player: playback state machine and frame stepping.
//!
//! A [`Player`] walks an index over the frames of a [`FrameSource`] at a fixed
//! rate, rendering each one through a [`FrameSink`]. Time comes either from the
//! host (`manual_update`, every [`Player::tick`] carries the elapsed
//! milliseconds) or from a [`Clock`], with a [`FrameScheduler`] re-armed on
//! every step so the host loop knows when to call [`Player::service_frame`].
//!
//! Step order inside one tick:
//! 1. re-arm the scheduler (scheduler-driven players only)
//! 2. accumulate elapsed time; return early if no frame boundary was crossed
//! 3. render the current frame
//! 4. if the previous step reached the terminal frame, run the completion
//!    transition (emit `Completed`, then pause or restart)
//! 5. otherwise move one frame in the current direction and emit `FrameEntered`
//!
//! Rendering happens *before* the index moves. When the sink fails, the index
//! is still advanced and the error is returned afterwards, so calling `tick`
//! again renders the next frame rather than retrying the failed one.

use log::{debug, trace, warn};

use crate::config::PlayerConfig;
use crate::error::SpriteError;
use crate::events::{EventKind, EventListener, ListenerId, Notifier, PlayerEvent};
use crate::frames::{FrameSink, FrameSource};
use crate::scheduler::{Clock, FrameHandle, FrameQueue, FrameScheduler, SystemClock};
use crate::state::PlaybackState;
use crate::timing::FrameTimer;
use crate::Result;

/// Fixed-rate frame sequencer over a [`FrameSource`], rendering through a [`FrameSink`].
pub struct Player<S, K> {
    source: S,
    sink: K,
    config: PlayerConfig,
    frame_count: usize,
    last_frame: usize,

    current_frame: usize,
    playing: bool,
    reversed: bool,
    /// The index reached the terminal frame for the current direction.
    complete: bool,
    /// Rewound by `stop()` (or never started).
    stopped: bool,

    timer: FrameTimer,
    scheduler: Box<dyn FrameScheduler>,
    clock: Box<dyn Clock>,
    /// Pending scheduler callback; always `None` for manual players.
    scheduled: Option<FrameHandle>,

    notifier: Notifier,
}

impl<S, K> Player<S, K>
where
    S: FrameSource,
    K: FrameSink<S::Frame>,
{
    /// Create a player driven by a [`FrameQueue`] and the system clock.
    pub fn new(source: S, sink: K, config: PlayerConfig) -> Result<Self> {
        Self::with_runtime(source, sink, config, FrameQueue::new(), SystemClock::new())
    }

    /// Create a player with an explicit scheduler and clock.
    pub fn with_runtime(
        source: S,
        sink: K,
        config: PlayerConfig,
        scheduler: impl FrameScheduler + 'static,
        clock: impl Clock + 'static,
    ) -> Result<Self> {
        config.validate()?;
        let frame_count = config.resolve_frame_count(source.frame_count())?;
        let timer = FrameTimer::new(config.frame_rate)?;

        if config.yoyo && !config.loop_playback {
            warn!("yoyo has no effect without loop; playing once");
        }
        debug!(
            "sprite player: {} frames at {} fps (manual={}, loop={}, yoyo={})",
            frame_count,
            config.frame_rate,
            config.manual_update,
            config.loop_playback,
            config.yoyo
        );

        Ok(Self {
            source,
            sink,
            config,
            frame_count,
            last_frame: frame_count - 1,
            current_frame: 0,
            playing: false,
            reversed: false,
            complete: false,
            stopped: true,
            timer,
            scheduler: Box::new(scheduler),
            clock: Box::new(clock),
            scheduled: None,
            notifier: Notifier::new(),
        })
    }

    /// Start or resume playback and evaluate one step immediately.
    ///
    /// Calling `play` while already playing re-arms the scheduler and clears
    /// the completion flag.
    pub fn play(&mut self) -> Result<()> {
        if !self.playing {
            debug!("play from frame {}", self.current_frame);
        }
        self.playing = true;
        self.complete = false;
        self.stopped = false;
        self.step(None)
    }

    /// Halt on the current frame and disarm the scheduler.
    pub fn pause(&mut self) {
        if !self.playing {
            return;
        }
        self.playing = false;
        self.disarm();
        self.timer.rebase();
        debug!("paused at frame {}", self.current_frame);
    }

    /// Pause and rewind to the first frame. Nothing is rendered.
    pub fn stop(&mut self) {
        self.pause();
        self.current_frame = 0;
        self.complete = false;
        self.stopped = true;
        self.timer.reset();
    }

    /// Jump to `frame` and play from there. Out-of-range targets are clamped.
    pub fn goto_and_play(&mut self, frame: usize) -> Result<()> {
        self.current_frame = self.clamp_frame(frame);
        self.complete = false;
        self.stopped = false;
        if !self.playing {
            self.play()?;
        }
        Ok(())
    }

    /// Pause, jump to `frame` and render it. Out-of-range targets are clamped.
    pub fn goto_and_stop(&mut self, frame: usize) -> Result<()> {
        if self.playing {
            self.pause();
        }
        self.current_frame = self.clamp_frame(frame);
        self.complete = false;
        self.stopped = false;
        self.render_current()
    }

    /// Advance time by `elapsed_ms`, or by the clock when `None`.
    ///
    /// Manual players must pass the elapsed time. Ticks while not playing are
    /// ignored.
    pub fn tick(&mut self, elapsed_ms: Option<f64>) -> Result<()> {
        match elapsed_ms {
            None if self.config.manual_update => return Err(SpriteError::MissingElapsed),
            Some(ms) if ms < 0.0 || !ms.is_finite() => {
                return Err(SpriteError::InvalidElapsed { elapsed_ms: ms })
            }
            _ => {}
        }
        self.step(elapsed_ms)
    }

    /// Deliver this player's scheduler callback if it is due. Returns whether
    /// a step ran.
    ///
    /// Requests armed by other players sharing the scheduler stay pending. A
    /// request the host already drained with [`FrameScheduler::next_due`]
    /// counts as delivered.
    pub fn service_frame(&mut self) -> Result<bool> {
        let Some(handle) = self.scheduled else {
            return Ok(false);
        };
        if self.scheduler.is_pending(handle) && !self.scheduler.take(handle) {
            trace!("frame callback {:?} not due", handle);
            return Ok(false);
        }
        self.scheduled = None;
        self.step(None)?;
        Ok(true)
    }

    /// Stop playback, detach every listener and hand back the source and sink.
    pub fn dispose(mut self) -> (S, K) {
        self.stop();
        self.notifier.clear();
        debug!("sprite player disposed");
        (self.source, self.sink)
    }

    fn step(&mut self, elapsed_ms: Option<f64>) -> Result<()> {
        if !self.playing {
            return Ok(());
        }

        let elapsed = if self.config.manual_update {
            elapsed_ms.unwrap_or(0.0)
        } else {
            let observed = self.timer.observe(self.clock.now_ms());
            self.arm();
            elapsed_ms.unwrap_or(observed)
        };

        let intervals = self.timer.accumulate(elapsed);
        if intervals == 0 {
            return Ok(());
        }
        if intervals > 1 {
            trace!("{} frame intervals elapsed, skipping {}", intervals, intervals - 1);
        }

        let rendered = self.render_current();

        if self.complete {
            let restarted = self.complete_sweep();
            return rendered.and(restarted);
        }

        self.advance();
        rendered?;
        self.notifier.emit(&PlayerEvent::FrameEntered {
            frame: self.current_frame,
        });
        Ok(())
    }

    fn advance(&mut self) {
        if self.reversed {
            self.current_frame = self.current_frame.saturating_sub(1);
            self.complete = self.current_frame == 0;
        } else {
            self.current_frame = (self.current_frame + 1).min(self.last_frame);
            self.complete = self.current_frame == self.last_frame;
        }
    }

    fn complete_sweep(&mut self) -> Result<()> {
        self.notifier.emit(&PlayerEvent::Completed {
            frame: self.current_frame,
            reversed: self.reversed,
        });

        if !self.config.loop_playback {
            self.pause();
            return Ok(());
        }

        if self.config.yoyo {
            self.reversed = !self.reversed;
        }
        let restart = if self.reversed { self.last_frame } else { 0 };
        debug!(
            "sweep complete, restarting at frame {} ({})",
            restart,
            if self.reversed { "reversed" } else { "forward" }
        );
        self.goto_and_play(restart)
    }

    fn render_current(&mut self) -> Result<()> {
        let index = self.current_frame;
        let frame = self
            .source
            .frame(index)
            .ok_or(SpriteError::FrameNotFound { index })?;
        trace!("render frame {}", index);
        self.sink.render(frame).map_err(|e| e.at_frame(index))
    }

    fn clamp_frame(&self, frame: usize) -> usize {
        if frame > self.last_frame {
            warn!(
                "frame {} out of range [0, {}], clamping",
                frame, self.last_frame
            );
            self.last_frame
        } else {
            frame
        }
    }

    fn arm(&mut self) {
        self.disarm();
        self.scheduled = Some(self.scheduler.schedule());
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.scheduled.take() {
            self.scheduler.cancel(handle);
        }
    }
}

impl<S, K> Player<S, K> {
    /// Listen to one kind of notification.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        listener: impl EventListener + 'static,
    ) -> ListenerId {
        self.notifier.subscribe(kind, listener)
    }

    /// Listen to every notification.
    pub fn subscribe_all(&mut self, listener: impl EventListener + 'static) -> ListenerId {
        self.notifier.subscribe_all(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.notifier.listener_count()
    }

    #[inline]
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    #[inline]
    pub fn last_frame(&self) -> usize {
        self.last_frame
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[inline]
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn state(&self) -> PlaybackState {
        if self.playing {
            PlaybackState::Playing
        } else if self.complete {
            PlaybackState::Ended
        } else if self.stopped {
            PlaybackState::Stopped
        } else {
            PlaybackState::Paused
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    #[inline]
    pub fn frame_interval_ms(&self) -> f64 {
        self.timer.interval_ms()
    }

    /// Whether a scheduler callback is armed for this player.
    pub fn has_pending_frame(&self) -> bool {
        self.scheduled
            .map_or(false, |handle| self.scheduler.is_pending(handle))
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }
}

impl<S: FrameSource, K> Player<S, K> {
    /// Descriptor of the current frame.
    pub fn current_descriptor(&self) -> Option<&S::Frame> {
        self.source.frame(self.current_frame)
    }
}

impl<S, K> std::fmt::Debug for Player<S, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("state", &self.state())
            .field("current_frame", &self.current_frame)
            .field("frame_count", &self.frame_count)
            .field("reversed", &self.reversed)
            .field("complete", &self.complete)
            .field("scheduled", &self.scheduled)
            .field("timer", &self.timer)
            .field("notifier", &self.notifier)
            .finish()
    }
}
