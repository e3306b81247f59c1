//! Typed feedback events with pre-allocated ring buffers.
//!
//! The scheduler and intake emit events while they work; the smelter delivers
//! them in batch at the end of each step. Hosts subscribe passive listeners to
//! play the kickoff effect, the per-unit "ding", or to drive a UI. Listeners
//! are fire-and-forget: nothing they do feeds back into the scheduler.
//!
//! Event kinds can be suppressed via [`EventBus::suppress`], which prevents
//! any allocation or recording for that kind.

use crate::fixed::Ticks;
use crate::id::{ItemTypeId, StationKey};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Why a job made no progress this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StallReason {
    NoFuel,
    OutputFull,
}

/// Why a job left the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalReason {
    /// The block no longer resolves to a station of the configured kind.
    StationMissing,
    /// The input slot is empty or holds a different item than at creation.
    InputChanged,
    /// The last input unit was consumed.
    InputExhausted,
    /// The host reported the block destroyed.
    StationDestroyed,
}

/// A smelter event. All events carry the tick at which they occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // -- Jobs --
    /// A job was created; hosts play the one-time kickoff effect.
    JobStarted {
        station: StationKey,
        required_ticks: Ticks,
        tick: Ticks,
    },
    /// One input unit was converted; hosts play the completion sound.
    UnitSmelted {
        station: StationKey,
        output: ItemTypeId,
        deposited: bool,
        tick: Ticks,
    },
    JobStalled {
        station: StationKey,
        reason: StallReason,
        tick: Ticks,
    },
    JobResumed {
        station: StationKey,
        tick: Ticks,
    },
    JobRemoved {
        station: StationKey,
        reason: RemovalReason,
        tick: Ticks,
    },

    // -- Registries --
    TierCreated {
        name: String,
        tick: Ticks,
    },
    TierDeleted {
        name: String,
        tick: Ticks,
    },
    StationAssigned {
        station: StationKey,
        tier: String,
        tick: Ticks,
    },
    StationCleared {
        station: StationKey,
        tick: Ticks,
    },
}

/// Discriminant tag for event types, used for suppression and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    JobStarted,
    UnitSmelted,
    JobStalled,
    JobResumed,
    JobRemoved,
    TierCreated,
    TierDeleted,
    StationAssigned,
    StationCleared,
}

/// Total number of event kinds.
const EVENT_KIND_COUNT: usize = 9;

impl Event {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::JobStarted { .. } => EventKind::JobStarted,
            Event::UnitSmelted { .. } => EventKind::UnitSmelted,
            Event::JobStalled { .. } => EventKind::JobStalled,
            Event::JobResumed { .. } => EventKind::JobResumed,
            Event::JobRemoved { .. } => EventKind::JobRemoved,
            Event::TierCreated { .. } => EventKind::TierCreated,
            Event::TierDeleted { .. } => EventKind::TierDeleted,
            Event::StationAssigned { .. } => EventKind::StationAssigned,
            Event::StationCleared { .. } => EventKind::StationCleared,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer -- pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A pre-allocated ring buffer for events. Fixed capacity; when full, the
/// oldest events are dropped.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Option<Event>>,
    /// Write position (wraps around).
    head: usize,
    len: usize,
    /// Total events ever written (including dropped).
    total_written: u64,
}

impl EventBuffer {
    /// Create a new ring buffer with the given capacity.
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    /// Push an event. If full, the oldest event is dropped.
    pub fn push(&mut self, event: Event) {
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Iterate over events from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        let start = if self.len < self.capacity() {
            0
        } else {
            // head is the next write position, which is the oldest entry
            self.head
        };
        (0..self.len).filter_map(move |i| self.events[(start + i) % self.capacity()].as_ref())
    }

    /// Clear all events. `total_written` is kept.
    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// A passive listener receives events read-only.
pub type PassiveListener = Box<dyn FnMut(&Event)>;

/// One ring buffer per event kind, listener lists, and suppression flags.
pub struct EventBus {
    buffers: [Option<EventBuffer>; EVENT_KIND_COUNT],
    suppressed: [bool; EVENT_KIND_COUNT],
    listeners: [Vec<PassiveListener>; EVENT_KIND_COUNT],
    default_capacity: usize,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("buffers", &self.buffers)
            .field("suppressed", &self.suppressed)
            .field("default_capacity", &self.default_capacity)
            .finish_non_exhaustive()
    }
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity per kind.
    pub fn new(default_capacity: usize) -> Self {
        Self {
            buffers: Default::default(),
            suppressed: [false; EVENT_KIND_COUNT],
            listeners: Default::default(),
            default_capacity,
        }
    }

    /// Suppress an event kind. Suppressed events are never allocated or buffered.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
        self.buffers[kind.index()] = None;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Buffer an event for the next delivery. No-op if its kind is suppressed.
    pub fn emit(&mut self, event: Event) {
        let idx = event.kind().index();
        if self.suppressed[idx] {
            return;
        }
        let capacity = self.default_capacity;
        self.buffers[idx]
            .get_or_insert_with(|| EventBuffer::new(capacity))
            .push(event);
    }

    /// Register a listener for an event kind. Listeners run in registration order.
    pub fn on(&mut self, kind: EventKind, listener: PassiveListener) {
        self.listeners[kind.index()].push(listener);
    }

    /// Deliver all buffered events to listeners, oldest first, then clear
    /// the buffers.
    pub fn deliver(&mut self) {
        for idx in 0..EVENT_KIND_COUNT {
            let Some(buffer) = self.buffers[idx].as_mut() else {
                continue;
            };
            if buffer.is_empty() {
                continue;
            }
            for listener in &mut self.listeners[idx] {
                for event in buffer.iter() {
                    listener(event);
                }
            }
            buffer.clear();
        }
    }

    /// Read-only view of the buffer for a kind.
    pub fn buffer(&self, kind: EventKind) -> Option<&EventBuffer> {
        self.buffers[kind.index()].as_ref()
    }

    /// Events currently buffered for a kind (not yet delivered).
    pub fn buffered_count(&self, kind: EventKind) -> usize {
        self.buffers[kind.index()]
            .as_ref()
            .map(|b| b.len())
            .unwrap_or(0)
    }

    /// Total events ever emitted for a kind (including delivered and dropped).
    pub fn total_emitted(&self, kind: EventKind) -> u64 {
        self.buffers[kind.index()]
            .as_ref()
            .map(|b| b.total_written())
            .unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn station() -> StationKey {
        StationKey::new("world", 1, 2, 3)
    }

    fn started(tick: Ticks) -> Event {
        Event::JobStarted {
            station: station(),
            required_ticks: 100,
            tick,
        }
    }

    #[test]
    fn buffer_push_and_iterate_in_order() {
        let mut buf = EventBuffer::new(4);
        buf.push(started(1));
        buf.push(started(2));
        let ticks: Vec<Ticks> = buf
            .iter()
            .map(|e| match e {
                Event::JobStarted { tick, .. } => *tick,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(ticks, vec![1, 2]);
    }

    #[test]
    fn buffer_drops_oldest_when_full() {
        let mut buf = EventBuffer::new(2);
        buf.push(started(1));
        buf.push(started(2));
        buf.push(started(3));
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.total_written(), 3);
        let first = buf.iter().next().unwrap();
        assert_eq!(*first, started(2));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let buf = EventBuffer::new(0);
        assert_eq!(buf.capacity(), 1);
    }

    #[test]
    fn deliver_reaches_listeners_and_clears() {
        let mut bus = EventBus::new(16);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.on(
            EventKind::JobStarted,
            Box::new(move |e| sink.borrow_mut().push(e.clone())),
        );

        bus.emit(started(5));
        assert_eq!(bus.buffered_count(EventKind::JobStarted), 1);
        bus.deliver();

        assert_eq!(seen.borrow().as_slice(), &[started(5)]);
        assert_eq!(bus.buffered_count(EventKind::JobStarted), 0);
        assert_eq!(bus.total_emitted(EventKind::JobStarted), 1);
    }

    #[test]
    fn listeners_only_see_their_kind() {
        let mut bus = EventBus::new(16);
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        bus.on(EventKind::UnitSmelted, Box::new(move |_| *c.borrow_mut() += 1));
        bus.emit(started(1));
        bus.deliver();
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn suppressed_kinds_are_not_buffered() {
        let mut bus = EventBus::new(16);
        bus.suppress(EventKind::JobStarted);
        bus.emit(started(1));
        assert!(bus.is_suppressed(EventKind::JobStarted));
        assert!(bus.buffer(EventKind::JobStarted).is_none());
        assert_eq!(bus.total_emitted(EventKind::JobStarted), 0);
    }

    #[test]
    fn event_kind_matches_variant() {
        let e = Event::JobRemoved {
            station: station(),
            reason: RemovalReason::InputChanged,
            tick: 0,
        };
        assert_eq!(e.kind(), EventKind::JobRemoved);
        let e = Event::TierCreated {
            name: "basic".into(),
            tick: 0,
        };
        assert_eq!(e.kind(), EventKind::TierCreated);
    }
}
