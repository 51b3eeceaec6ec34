//! Notifications emitted by the player.
//!
//! The player owns a [`Notifier`]; hosts subscribe listeners to a notification
//! kind (or to all of them) and are called synchronously, in registration
//! order, while the player steps.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Kinds of player notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A frame was rendered and the index advanced
    FrameEntered,
    /// A sweep reached its terminal frame
    Completed,
}

impl EventKind {
    /// Get the name of this event kind
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::FrameEntered => "frame_entered",
            Self::Completed => "completed",
        }
    }

    /// Parse a kind from its name. The short DOM-style names are accepted too.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "frame_entered" | "enterFrame" => Some(Self::FrameEntered),
            "completed" | "complete" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Notification payload. The player's state can also be queried directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// Emitted after a successful render + advance; `frame` is the new index.
    FrameEntered { frame: usize },
    /// Emitted once per sweep, before any loop or yoyo restart.
    Completed { frame: usize, reversed: bool },
}

impl PlayerEvent {
    #[inline]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::FrameEntered { .. } => EventKind::FrameEntered,
            Self::Completed { .. } => EventKind::Completed,
        }
    }

    #[inline]
    pub fn frame(&self) -> usize {
        match *self {
            Self::FrameEntered { frame } | Self::Completed { frame, .. } => frame,
        }
    }
}

/// Receives player notifications.
pub trait EventListener {
    fn on_event(&mut self, event: &PlayerEvent);
}

impl<F> EventListener for F
where
    F: FnMut(&PlayerEvent),
{
    fn on_event(&mut self, event: &PlayerEvent) {
        self(event)
    }
}

/// Handle returned by [`Notifier::subscribe`], used to unsubscribe.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u32);

struct Registration {
    id: ListenerId,
    /// `None` listens to every kind.
    kind: Option<EventKind>,
    listener: Box<dyn EventListener>,
}

/// Registry of listeners, dispatched synchronously in registration order.
#[derive(Default)]
pub struct Notifier {
    registrations: Vec<Registration>,
    next_id: u32,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen to one kind of notification.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        listener: impl EventListener + 'static,
    ) -> ListenerId {
        self.register(Some(kind), Box::new(listener))
    }

    /// Listen to every notification.
    pub fn subscribe_all(&mut self, listener: impl EventListener + 'static) -> ListenerId {
        self.register(None, Box::new(listener))
    }

    fn register(&mut self, kind: Option<EventKind>, listener: Box<dyn EventListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.registrations.push(Registration { id, kind, listener });
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        self.registrations.len() != before
    }

    /// Deliver `event` to every interested listener.
    pub fn emit(&mut self, event: &PlayerEvent) {
        let kind = event.kind();
        for reg in &mut self.registrations {
            if reg.kind.map_or(true, |k| k == kind) {
                reg.listener.on_event(event);
            }
        }
    }

    /// Detach every listener.
    pub fn clear(&mut self) {
        self.registrations.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.registrations.len()
    }

    /// Listeners that would receive a notification of `kind`.
    pub fn listener_count_for(&self, kind: EventKind) -> usize {
        self.registrations
            .iter()
            .filter(|r| r.kind.map_or(true, |k| k == kind))
            .count()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.registrations.len())
            .finish()
    }
}

/// Listener that forwards notifications to the `log` facade.
#[derive(Debug, Clone, Default)]
pub struct LoggingListener {
    label: String,
}

impl LoggingListener {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl EventListener for LoggingListener {
    fn on_event(&mut self, event: &PlayerEvent) {
        log::debug!(
            "[{}] {} at frame {}",
            self.label,
            event.kind().name(),
            event.frame()
        );
    }
}

/// Listener that collects events. Clones share the same buffer, so one copy
/// can be subscribed while another is inspected.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<PlayerEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything collected so far.
    pub fn events(&self) -> Vec<PlayerEvent> {
        self.events.borrow().clone()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.kind() == kind)
            .count()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl EventListener for EventLog {
    fn on_event(&mut self, event: &PlayerEvent) {
        self.events.borrow_mut().push(*event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip() {
        for kind in [EventKind::FrameEntered, EventKind::Completed] {
            assert_eq!(EventKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(
            EventKind::from_name("enterFrame"),
            Some(EventKind::FrameEntered)
        );
        assert_eq!(EventKind::from_name("complete"), Some(EventKind::Completed));
        assert_eq!(EventKind::from_name("loop"), None);
    }

    #[test]
    fn listeners_are_filtered_by_kind() {
        let mut notifier = Notifier::new();
        let frames = EventLog::new();
        let everything = EventLog::new();
        notifier.subscribe(EventKind::FrameEntered, frames.clone());
        notifier.subscribe_all(everything.clone());

        notifier.emit(&PlayerEvent::FrameEntered { frame: 1 });
        notifier.emit(&PlayerEvent::Completed {
            frame: 3,
            reversed: false,
        });

        assert_eq!(frames.events(), vec![PlayerEvent::FrameEntered { frame: 1 }]);
        assert_eq!(everything.len(), 2);
        assert_eq!(notifier.listener_count_for(EventKind::Completed), 1);
        assert_eq!(notifier.listener_count_for(EventKind::FrameEntered), 2);
    }

    #[test]
    fn emit_runs_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = Notifier::new();
        for tag in ["first", "second", "third"] {
            let order = order.clone();
            notifier.subscribe(EventKind::Completed, move |_: &PlayerEvent| {
                order.borrow_mut().push(tag)
            });
        }
        notifier.emit(&PlayerEvent::Completed {
            frame: 0,
            reversed: true,
        });
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn unsubscribe_and_clear() {
        let mut notifier = Notifier::new();
        let log = EventLog::new();
        let id = notifier.subscribe_all(log.clone());
        let other = notifier.subscribe_all(LoggingListener::new("sprite"));

        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.emit(&PlayerEvent::FrameEntered { frame: 2 });
        assert!(log.is_empty());

        assert_eq!(notifier.listener_count(), 1);
        notifier.clear();
        assert_eq!(notifier.listener_count(), 0);
        assert!(!notifier.unsubscribe(other));
    }

    #[test]
    fn events_serialize_with_a_type_tag() {
        let json = serde_json::to_value(PlayerEvent::Completed {
            frame: 3,
            reversed: false,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "completed", "frame": 3, "reversed": false})
        );
    }
}
