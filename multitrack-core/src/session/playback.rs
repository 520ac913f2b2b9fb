use std::collections::HashMap;
use std::time::Duration;

use crate::models::error::SessionError;
use crate::models::handles::{SinkHandle, TimerId};
use crate::models::state::PlaybackState;
use crate::models::track::{Track, TrackId};
use crate::processing::event_queue::EventQueue;
use crate::traits::audio_sink::AudioSink;
use crate::traits::clock::ClockTimer;

/// Drives an audio sink for one track at a time and keeps the playback clock.
///
/// ```text
/// stopped → playing ⇄ paused → stopped
/// ```
///
/// Each track gets one sink handle, loaded on first play and kept until
/// `invalidate` is called for it. The clock timer runs only while playing
/// and is cancelled before any transition away from playing, so a tick that
/// was already queued carries a dead id and is ignored.
///
/// Sink handles outlive a play-through, so end-of-audio is told apart by
/// queue sequence instead: a completion queued before the current
/// play-through started (or resumed) is ignored.
pub struct PlaybackController<S: AudioSink, T: ClockTimer> {
    sink: S,
    timer: T,
    clock_interval: Duration,
    state: PlaybackState,
    offset: Duration,
    handles: HashMap<TrackId, SinkHandle>,
    clock: Option<TimerId>,
    /// Queue sequence at which the current play-through started.
    started_at: u64,
}

impl<S: AudioSink, T: ClockTimer> PlaybackController<S, T> {
    pub fn new(sink: S, timer: T, clock_interval: Duration) -> Self {
        Self {
            sink,
            timer,
            clock_interval,
            state: PlaybackState::Stopped,
            offset: Duration::ZERO,
            handles: HashMap::new(),
            clock: None,
            started_at: 0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Last known position in the current track. Zero when stopped.
    pub fn offset(&self) -> Duration {
        self.offset
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Whether a sink handle is cached for `track`.
    pub fn has_handle(&self, track: TrackId) -> bool {
        self.handles.contains_key(&track)
    }

    /// Start `track` from the beginning, or resume it if it is paused.
    ///
    /// Transitions: stopped → playing, paused → playing. Already playing is
    /// a no-op. Fails without any state change if there is no track or it
    /// has no audio.
    pub fn play(
        &mut self,
        track: Option<&Track>,
        events: &EventQueue,
    ) -> Result<(), SessionError> {
        let track = track.ok_or(SessionError::NoActiveTrack)?;
        if !track.has_audio() {
            return Err(SessionError::EmptyTrack(track.id()));
        }

        match self.state {
            PlaybackState::Playing { track: current } if current == track.id() => return Ok(()),
            PlaybackState::Paused { track: current } if current == track.id() => {
                self.resume(events);
                return Ok(());
            }
            PlaybackState::Playing { .. } | PlaybackState::Paused { .. } => self.stop(),
            PlaybackState::Stopped => {}
        }

        let handle = self.handle_for(track, events)?;
        self.started_at = events.next_sequence();
        self.sink.seek(handle, Duration::ZERO);
        self.sink.play(handle);
        self.offset = Duration::ZERO;
        self.start_clock(events);
        self.state = PlaybackState::Playing { track: track.id() };
        log::info!("playing track {}", track.id());
        Ok(())
    }

    /// Transitions: playing → paused. No-op otherwise.
    pub fn pause(&mut self) {
        let PlaybackState::Playing { track } = self.state else {
            return;
        };
        let Some(handle) = self.handles.get(&track).copied() else {
            return;
        };
        self.cancel_clock();
        self.sink.pause(handle);
        self.offset = self.sink.current_offset(handle);
        self.state = PlaybackState::Paused { track };
        log::debug!("paused track {} at {:?}", track, self.offset);
    }

    /// Continue from the retained offset.
    ///
    /// Transitions: paused → playing. No-op otherwise.
    pub fn resume(&mut self, events: &EventQueue) {
        let PlaybackState::Paused { track } = self.state else {
            return;
        };
        let Some(handle) = self.handles.get(&track).copied() else {
            return;
        };
        self.started_at = events.next_sequence();
        self.sink.seek(handle, self.offset);
        self.sink.play(handle);
        self.start_clock(events);
        self.state = PlaybackState::Playing { track };
        log::debug!("resumed track {} at {:?}", track, self.offset);
    }

    /// Halt and rewind.
    ///
    /// Transitions: playing/paused → stopped. No-op when stopped.
    pub fn stop(&mut self) {
        let Some(track) = self.state.track() else {
            return;
        };
        self.cancel_clock();
        if let Some(handle) = self.handles.get(&track).copied() {
            self.sink.stop(handle);
        }
        self.offset = Duration::ZERO;
        self.state = PlaybackState::Stopped;
        log::debug!("stopped track {}", track);
    }

    /// Refresh the offset from the sink. Returns the new offset, or `None`
    /// for a tick of a cancelled timer.
    pub fn on_tick(&mut self, timer: TimerId) -> Option<Duration> {
        if self.clock != Some(timer) {
            return None;
        }
        let PlaybackState::Playing { track } = self.state else {
            return None;
        };
        let handle = self.handles.get(&track).copied()?;
        self.offset = self.sink.current_offset(handle);
        Some(self.offset)
    }

    /// End of audio reached. `sequence` is the queue sequence the event
    /// carried. Returns whether it applied to the current play-through (and
    /// playback is now stopped).
    pub fn on_finished(&mut self, handle: SinkHandle, sequence: u64) -> bool {
        let PlaybackState::Playing { track } = self.state else {
            return false;
        };
        if self.handles.get(&track) != Some(&handle) {
            return false;
        }
        if sequence < self.started_at {
            log::debug!("ignoring end of audio from an earlier play-through of {}", track);
            return false;
        }
        self.cancel_clock();
        self.offset = Duration::ZERO;
        self.state = PlaybackState::Stopped;
        log::debug!("track {} played to the end", track);
        true
    }

    /// Drop the cached sink handle of `track`, stopping it first if it is
    /// the one loaded for playback. Call whenever the track's audio changes
    /// or the track goes away.
    pub fn invalidate(&mut self, track: TrackId) {
        if self.state.track() == Some(track) {
            self.stop();
        }
        if let Some(handle) = self.handles.remove(&track) {
            self.sink.unload(handle);
            log::debug!("released sink handle for track {}", track);
        }
    }

    fn handle_for(
        &mut self,
        track: &Track,
        events: &EventQueue,
    ) -> Result<SinkHandle, SessionError> {
        if let Some(handle) = self.handles.get(&track.id()) {
            return Ok(*handle);
        }
        let handle = self.sink.load(track.fragments(), events.completion_callback())?;
        self.handles.insert(track.id(), handle);
        Ok(handle)
    }

    fn start_clock(&mut self, events: &EventQueue) {
        self.cancel_clock();
        self.clock = Some(self.timer.start(self.clock_interval, events.tick_callback()));
    }

    fn cancel_clock(&mut self) {
        if let Some(id) = self.clock.take() {
            self.timer.cancel(id);
        }
    }
}

impl<S: AudioSink, T: ClockTimer> Drop for PlaybackController<S, T> {
    fn drop(&mut self) {
        self.stop();
        for (_, handle) in self.handles.drain() {
            self.sink.unload(handle);
        }
    }
}
