use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::handles::{CaptureHandle, SinkHandle, TimerId};
use crate::traits::audio_sink::CompletionCallback;
use crate::traits::capture_source::{CaptureCallback, CaptureEvent};
use crate::traits::clock::TickCallback;

/// An external occurrence waiting to be handled by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Capture { handle: CaptureHandle, event: CaptureEvent },
    PlaybackFinished { handle: SinkHandle },
    ClockTick { timer: TimerId },
}

/// FIFO mailbox between provider callbacks and the session.
///
/// Callbacks handed to providers only push here, from whatever thread they
/// run on. The session pops and handles events one at a time, so no two
/// mutations ever interleave. Clones share the same queue.
///
/// Every pushed event is stamped with a sequence number, increasing in push
/// order, so a consumer can tell whether an event was queued before or
/// after some point in its own timeline.
///
/// Unbounded: events are never dropped, since every fragment must reach the
/// recording.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<QueueInner>>,
}

#[derive(Debug, Default)]
struct QueueInner {
    events: VecDeque<(u64, SessionEvent)>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: SessionEvent) {
        let mut inner = self.inner.lock();
        let sequence = inner.next_sequence;
        inner.next_sequence += 1;
        inner.events.push_back((sequence, event));
    }

    /// Remove and return the oldest event.
    pub fn pop(&self) -> Option<SessionEvent> {
        self.pop_sequenced().map(|(_, event)| event)
    }

    /// Remove and return the oldest event with its sequence number.
    pub fn pop_sequenced(&self) -> Option<(u64, SessionEvent)> {
        self.inner.lock().events.pop_front()
    }

    /// Sequence number the next pushed event will carry. Everything already
    /// queued has a smaller one.
    pub fn next_sequence(&self) -> u64 {
        self.inner.lock().next_sequence
    }

    /// Number of events waiting.
    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().events.is_empty()
    }

    /// Drop everything waiting.
    pub fn clear(&self) {
        self.inner.lock().events.clear();
    }

    /// Callback for `CaptureSource::open` that enqueues capture events.
    pub fn capture_callback(&self) -> CaptureCallback {
        let queue = self.clone();
        Arc::new(move |handle, event| queue.push(SessionEvent::Capture { handle, event }))
    }

    /// Callback for `AudioSink::load` that enqueues end-of-audio.
    pub fn completion_callback(&self) -> CompletionCallback {
        let queue = self.clone();
        Arc::new(move |handle| queue.push(SessionEvent::PlaybackFinished { handle }))
    }

    /// Callback for `ClockTimer::start` that enqueues ticks.
    pub fn tick_callback(&self) -> TickCallback {
        let queue = self.clone();
        Arc::new(move |timer| queue.push(SessionEvent::ClockTick { timer }))
    }
}
