//! Frame scheduling and time sources.
//!
//! A [`FrameScheduler`] plays the role of the host's animation-frame provider:
//! the player arms it with [`FrameScheduler::schedule`] and disarms it with
//! [`FrameScheduler::cancel`]. On each host frame the host calls
//! [`crate::Player::service_frame`], which claims only the player's own due
//! request with [`FrameScheduler::take`], so several players can share one
//! scheduler. A [`Clock`] supplies wall-clock milliseconds for players that
//! are not driven manually.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Opaque handle to a pending frame callback.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FrameHandle(pub u64);

/// Host animation-frame provider.
pub trait FrameScheduler {
    /// Request a callback on the next frame.
    fn schedule(&mut self) -> FrameHandle;

    /// Drop a pending request. Unknown or already delivered handles are ignored.
    fn cancel(&mut self, handle: FrameHandle);

    /// Next request whose frame has arrived, if any, removing it.
    fn next_due(&mut self) -> Option<FrameHandle>;

    /// Remove `handle` if its frame has arrived. Returns whether it was due.
    /// Other pending requests are left untouched.
    fn take(&mut self, handle: FrameHandle) -> bool;

    /// Whether `handle` is still waiting to be delivered.
    fn is_pending(&self, handle: FrameHandle) -> bool;
}

#[derive(Debug, Default)]
struct QueueState {
    next: u64,
    pending: VecDeque<FrameHandle>,
}

/// First-in first-out frame requests; every pending request is due on the next
/// poll. Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    state: Rc<RefCell<QueueState>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests waiting to be delivered.
    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }
}

impl FrameScheduler for FrameQueue {
    fn schedule(&mut self) -> FrameHandle {
        let mut state = self.state.borrow_mut();
        state.next = state.next.wrapping_add(1);
        let handle = FrameHandle(state.next);
        state.pending.push_back(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        self.state.borrow_mut().pending.retain(|h| *h != handle);
    }

    fn next_due(&mut self) -> Option<FrameHandle> {
        self.state.borrow_mut().pending.pop_front()
    }

    fn take(&mut self, handle: FrameHandle) -> bool {
        let mut state = self.state.borrow_mut();
        match state.pending.iter().position(|h| *h == handle) {
            Some(index) => {
                state.pending.remove(index);
                true
            }
            None => false,
        }
    }

    fn is_pending(&self, handle: FrameHandle) -> bool {
        self.state.borrow().pending.contains(&handle)
    }
}

/// Monotonic millisecond time source.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: instant::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: instant::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: f64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn set(&self, ms: f64) {
        self.now_ms.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }
}
