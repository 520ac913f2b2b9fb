use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::history::command::{Command, Direction, EditKind, Selection};
use crate::history::command_history::CommandHistory;
use crate::models::config::SessionConfiguration;
use crate::models::error::SessionError;
use crate::models::handles::DeviceId;
use crate::models::snapshot::{SessionSnapshot, TrackSummary};
use crate::models::state::{PlaybackState, RecordingState};
use crate::models::track::{EffectTag, Track, TrackId};
use crate::processing::event_queue::{EventQueue, SessionEvent};
use crate::processing::timing;
use crate::session::playback::PlaybackController;
use crate::session::recording::{FinishedRecording, RecordingController};
use crate::storage::track_store::TrackStore;
use crate::traits::audio_sink::AudioSink;
use crate::traits::capture_source::{CaptureEvent, CaptureSource};
use crate::traits::clock::ClockTimer;
use crate::traits::session_delegate::SessionDelegate;

/// The one entry point for the presentation layer.
///
/// Generic over the capture, sink and timer providers. Owns the track store,
/// the command history, both controllers and the event queue their callbacks
/// feed; nothing else holds a reference to any of them.
///
/// ```text
/// [CaptureSource] ─┐                   ┌→ RecordingController ─┐
/// [AudioSink]     ─┼→ EventQueue ──────┤                       ├→ TrackStore + CommandHistory
/// [ClockTimer]    ─┘  (process_events) └→ PlaybackController   │
/// UI intents ──────────────────────────────────────────────────┘
/// ```
///
/// Every intent that mutates a track records exactly one history command.
/// Playback of a track is stopped before any change that rewrites or
/// removes its audio, and before the active track changes.
pub struct SessionController<C: CaptureSource, S: AudioSink, T: ClockTimer> {
    config: SessionConfiguration,
    store: TrackStore,
    history: CommandHistory,
    recorder: RecordingController<C>,
    player: PlaybackController<S, T>,
    events: EventQueue,
    device_selection: HashMap<TrackId, DeviceId>,
    delegate: Option<Arc<dyn SessionDelegate>>,
}

impl<C: CaptureSource, S: AudioSink, T: ClockTimer> SessionController<C, S, T> {
    pub fn new(
        config: SessionConfiguration,
        capture: C,
        sink: S,
        timer: T,
    ) -> Result<Self, SessionError> {
        config.validate().map_err(SessionError::InvalidConfiguration)?;

        Ok(Self {
            store: TrackStore::new(config.track_name_prefix.clone()),
            history: CommandHistory::with_limit(config.max_history),
            recorder: RecordingController::new(capture),
            player: PlaybackController::new(sink, timer, config.clock_interval),
            events: EventQueue::new(),
            device_selection: HashMap::new(),
            delegate: None,
            config,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn SessionDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn config(&self) -> &SessionConfiguration {
        &self.config
    }

    /// The queue provider callbacks feed. Hosts that deliver events
    /// themselves may push here and then call `process_events`.
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn tracks(&self) -> &[Track] {
        self.store.tracks()
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.store.get(id)
    }

    pub fn active_track_id(&self) -> Option<TrackId> {
        self.store.active()
    }

    pub fn active_track(&self) -> Option<&Track> {
        self.store.active_track()
    }

    pub fn track_duration(&self, id: TrackId) -> Option<Duration> {
        self.store.get(id).map(|t| t.duration(self.config.fragment_interval))
    }

    pub fn recording_state(&self) -> RecordingState {
        self.recorder.state()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.player.state()
    }

    pub fn playback_offset(&self) -> Duration {
        self.player.offset()
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Device that recording into `track` would use right now.
    pub fn device_for(&self, track: TrackId) -> Option<&DeviceId> {
        self.config
            .capture_device
            .as_ref()
            .or_else(|| self.device_selection.get(&track))
    }

    pub fn capture_source(&self) -> &C {
        self.recorder.source()
    }

    pub fn audio_sink(&self) -> &S {
        self.player.sink()
    }

    // --- Track intents ---

    /// Append a new empty track and make it active.
    pub fn add_track(&mut self) -> TrackId {
        let before = self.store.active();
        self.stop_playback_unless(None);

        let track = self.store.add_track(None);
        let index = self.store.len() - 1;
        let id = track.id();
        self.commit(Command::AddTrack {
            track,
            index,
            selection: Selection {
                before,
                after: Some(id),
            },
        });
        id
    }

    /// Delete the active track.
    pub fn delete_active_track(&mut self) -> Result<TrackId, SessionError> {
        let id = self.store.active().ok_or(SessionError::NoActiveTrack)?;
        self.delete_track(id)?;
        Ok(id)
    }

    pub fn delete_track(&mut self, id: TrackId) -> Result<(), SessionError> {
        if !self.store.contains(id) {
            return Err(SessionError::NotFound(id));
        }
        if self.recorder.target() == Some(id) {
            log::warn!("deleting track {} while it is being recorded", id);
        }

        let before = self.store.active();
        let after = if before == Some(id) { None } else { before };
        self.prepare_for_change(id, true, after);

        let (index, track) = self.store.remove_track(id)?;
        self.player.invalidate(id);
        self.commit(Command::DeleteTrack {
            track,
            index,
            selection: Selection {
                before,
                after: self.store.active(),
            },
        });
        Ok(())
    }

    /// Change the active track. Not recorded in history.
    pub fn select_track(&mut self, id: Option<TrackId>) -> Result<(), SessionError> {
        if let Some(id) = id {
            if !self.store.contains(id) {
                return Err(SessionError::NotFound(id));
            }
        }
        if self.store.active() == id {
            return Ok(());
        }
        self.stop_playback_unless(id);
        self.store.set_active(id)?;
        self.notify_tracks_changed();
        Ok(())
    }

    /// Choose the capture device for recordings into `track`. Ignored while
    /// the configuration fixes a device.
    pub fn set_device(
        &mut self,
        track: TrackId,
        device: Option<DeviceId>,
    ) -> Result<(), SessionError> {
        if !self.store.contains(track) {
            return Err(SessionError::NotFound(track));
        }
        if self.config.capture_device.is_some() {
            log::debug!(
                "capture device is fixed by configuration; selection for {} kept for later",
                track
            );
        }
        match device {
            Some(device) => {
                self.device_selection.insert(track, device);
            }
            None => {
                self.device_selection.remove(&track);
            }
        }
        Ok(())
    }

    pub fn rename_track(
        &mut self,
        id: TrackId,
        name: impl Into<String>,
    ) -> Result<(), SessionError> {
        let name = name.into();
        self.edit_track(id, EditKind::Rename, |t| Ok(t.with_name(name)))
    }

    pub fn set_volume(&mut self, id: TrackId, volume: f32) -> Result<(), SessionError> {
        self.edit_track(id, EditKind::Volume, |t| Ok(t.with_mix(t.mix().with_volume(volume))))
    }

    pub fn set_pan(&mut self, id: TrackId, pan: f32) -> Result<(), SessionError> {
        self.edit_track(id, EditKind::Pan, |t| Ok(t.with_mix(t.mix().with_pan(pan))))
    }

    pub fn toggle_mute(&mut self, id: TrackId) -> Result<(), SessionError> {
        self.edit_track(id, EditKind::Mute, |t| {
            let mut mix = t.mix();
            mix.muted = !mix.muted;
            Ok(t.with_mix(mix))
        })
    }

    pub fn toggle_solo(&mut self, id: TrackId) -> Result<(), SessionError> {
        self.edit_track(id, EditKind::Solo, |t| {
            let mut mix = t.mix();
            mix.soloed = !mix.soloed;
            Ok(t.with_mix(mix))
        })
    }

    pub fn add_effect(&mut self, id: TrackId, effect: EffectTag) -> Result<(), SessionError> {
        self.edit_track(id, EditKind::AddEffect, |t| {
            let mut effects = t.effects().to_vec();
            effects.push(effect);
            Ok(t.with_effects(effects))
        })
    }

    pub fn remove_effect(&mut self, id: TrackId, index: usize) -> Result<(), SessionError> {
        self.edit_track(id, EditKind::RemoveEffect, |t| {
            if index >= t.effects().len() {
                return Err(SessionError::EffectNotFound { track: id, index });
            }
            let mut effects = t.effects().to_vec();
            effects.remove(index);
            Ok(t.with_effects(effects))
        })
    }

    // --- Recording intents ---

    /// Start recording into the active track, or stop the running recording.
    pub fn toggle_recording(&mut self) -> Result<RecordingState, SessionError> {
        if self.recorder.is_recording() {
            self.stop_recording()?;
        } else {
            self.start_recording()?;
        }
        Ok(self.recorder.state())
    }

    pub fn start_recording(&mut self) -> Result<(), SessionError> {
        if self.recorder.is_recording() {
            return Err(SessionError::AlreadyRecording);
        }
        let track = self.store.active().ok_or(SessionError::NoActiveTrack)?;
        if self.player.state().track() == Some(track) {
            self.with_playback(|player| player.stop());
        }

        let device = self
            .config
            .capture_device
            .as_ref()
            .or_else(|| self.device_selection.get(&track));
        self.recorder.start(track, device, self.events.capture_callback())?;
        self.notify_recording_changed();
        Ok(())
    }

    /// Stop recording and commit the captured audio to its track as one
    /// history command. Fragments still queued are taken in first.
    pub fn stop_recording(&mut self) -> Result<TrackId, SessionError> {
        let target = self.recorder.target().ok_or(SessionError::NotRecording)?;

        let (_, ended) = self.drain_events();
        let Some(finished) = self.recorder.stop() else {
            // The stream ended while the queue was drained and was committed there.
            return ended.unwrap_or(Ok(target));
        };
        self.notify_recording_changed();
        self.commit_recording(finished)
    }

    // --- Playback intents ---

    /// Play the active track from the start, or resume it if paused.
    pub fn play(&mut self) -> Result<(), SessionError> {
        if let Some(active) = self.store.active() {
            if self.recorder.target() == Some(active) {
                return Err(SessionError::AlreadyRecording);
            }
        }

        let before = self.player.state();
        self.player.play(self.store.active_track(), &self.events)?;
        if self.player.state() != before {
            self.notify_playback_changed();
        }
        Ok(())
    }

    pub fn pause(&mut self) {
        self.with_playback(|player| player.pause());
    }

    pub fn resume(&mut self) {
        let events = self.events.clone();
        self.with_playback(|player| player.resume(&events));
    }

    pub fn stop(&mut self) {
        self.with_playback(|player| player.stop());
    }

    /// Pause while playing, otherwise play.
    pub fn toggle_playback(&mut self) -> Result<(), SessionError> {
        if self.player.state().is_playing() {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    // --- History intents ---

    /// Revert the last track command. `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, SessionError> {
        self.replay(Direction::Reverse)
    }

    /// Re-apply the last undone command. `Ok(false)` when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool, SessionError> {
        self.replay(Direction::Forward)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.notify_tracks_changed();
    }

    // --- Events ---

    /// Handle every queued provider event in arrival order. Returns how many
    /// were handled.
    pub fn process_events(&mut self) -> usize {
        self.drain_events().0
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let active = self.store.active();
        let recording = self.recorder.target();
        let interval = self.config.fragment_interval;
        let offset = self.player.offset();

        SessionSnapshot {
            tracks: self
                .store
                .tracks()
                .iter()
                .map(|t| {
                    let id = Some(t.id());
                    TrackSummary::new(t, interval, id == active, id == recording)
                })
                .collect(),
            active_track: active,
            recording: self.recorder.state(),
            playback: self.player.state(),
            playback_offset_ms: u64::try_from(offset.as_millis()).unwrap_or(u64::MAX),
            playback_offset_display: timing::format_mm_ss(offset),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            undo_label: self.history.peek_undo().map(Command::label),
            redo_label: self.history.peek_redo().map(Command::label),
        }
    }

    // --- Internal helpers ---

    /// Handle every queued event. Returns how many were handled and, if a
    /// capture stream ended on its own, the outcome of committing what it
    /// captured.
    fn drain_events(&mut self) -> (usize, Option<Result<TrackId, SessionError>>) {
        let mut handled = 0;
        let mut ended = None;
        while let Some((sequence, event)) = self.events.pop_sequenced() {
            if let Some(outcome) = self.handle_event(sequence, event) {
                ended = Some(outcome);
            }
            handled += 1;
        }
        (handled, ended)
    }

    fn handle_event(
        &mut self,
        sequence: u64,
        event: SessionEvent,
    ) -> Option<Result<TrackId, SessionError>> {
        match event {
            SessionEvent::Capture {
                handle,
                event: CaptureEvent::Fragment(fragment),
            } => {
                self.recorder.on_fragment(handle, fragment);
            }
            SessionEvent::Capture {
                handle,
                event: CaptureEvent::Ended { reason },
            } => {
                let mut finished = self.recorder.abort(handle, reason)?;
                self.notify_recording_changed();
                if let Some(reason) = finished.aborted.take() {
                    self.report_error(&SessionError::DeviceUnavailable(reason));
                }
                let outcome = self.commit_recording(finished);
                if let Err(e) = &outcome {
                    self.report_error(e);
                }
                return Some(outcome);
            }
            SessionEvent::PlaybackFinished { handle } => {
                if self.player.on_finished(handle, sequence) {
                    self.notify_playback_changed();
                }
            }
            SessionEvent::ClockTick { timer } => {
                if let Some(offset) = self.player.on_tick(timer) {
                    if let Some(delegate) = &self.delegate {
                        delegate.on_playback_position(offset);
                    }
                }
            }
        }
        None
    }

    fn commit_recording(&mut self, finished: FinishedRecording) -> Result<TrackId, SessionError> {
        let id = finished.track;
        let Some(before) = self.store.get(id).cloned() else {
            log::warn!(
                "track {} was removed during recording; discarding {} fragments",
                id,
                finished.fragments.len()
            );
            return Err(SessionError::NotFound(id));
        };
        let after = before.with_fragments(finished.fragments);
        self.apply_edit(before, after, EditKind::Record)?;
        Ok(id)
    }

    /// Build the edited value with `edit` and commit it. Edits that change
    /// nothing are not recorded.
    fn edit_track(
        &mut self,
        id: TrackId,
        kind: EditKind,
        edit: impl FnOnce(&Track) -> Result<Track, SessionError>,
    ) -> Result<(), SessionError> {
        let before = self.store.get(id).cloned().ok_or(SessionError::NotFound(id))?;
        let after = edit(&before)?;
        if after == before {
            return Ok(());
        }
        self.apply_edit(before, after, kind)
    }

    fn apply_edit(
        &mut self,
        before: Track,
        after: Track,
        kind: EditKind,
    ) -> Result<(), SessionError> {
        let id = after.id();
        let rewrites_audio = !before.same_audio(&after);
        let active = self.store.active();
        self.prepare_for_change(id, rewrites_audio, active);

        self.store.replace_track(id, after.clone())?;
        if rewrites_audio {
            self.player.invalidate(id);
        }
        self.commit(Command::EditTrack {
            before,
            after,
            kind,
            selection: Selection::unchanged(active),
        });
        Ok(())
    }

    fn replay(&mut self, direction: Direction) -> Result<bool, SessionError> {
        let next = match direction {
            Direction::Reverse => self.history.peek_undo(),
            Direction::Forward => self.history.peek_redo(),
        };
        let Some(command) = next else {
            return Ok(false);
        };
        let track = command.track_id();
        let affects_audio = command.affects_audio();
        let selection = command.selection();
        let next_active = match direction {
            Direction::Reverse => selection.before,
            Direction::Forward => selection.after,
        };
        self.prepare_for_change(track, affects_audio, next_active);

        let result = match direction {
            Direction::Reverse => self.history.undo(&mut self.store),
            Direction::Forward => self.history.redo(&mut self.store),
        };
        match result {
            Ok(Some(command)) => {
                if affects_audio {
                    self.player.invalidate(track);
                }
                log::info!("{:?} '{}' on track {}", direction, command.label(), track);
                self.notify_tracks_changed();
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                self.report_error(&e);
                self.notify_tracks_changed();
                Err(e)
            }
        }
    }

    /// Stop playback if the coming change rewrites the audio being played or
    /// moves the selection away from it.
    fn prepare_for_change(
        &mut self,
        track: TrackId,
        affects_audio: bool,
        next_active: Option<TrackId>,
    ) {
        let Some(playing) = self.player.state().track() else {
            return;
        };
        if (affects_audio && playing == track) || Some(playing) != next_active {
            self.with_playback(|player| player.stop());
        }
    }

    /// Stop playback unless it is playing `keep`.
    fn stop_playback_unless(&mut self, keep: Option<TrackId>) {
        let playing = self.player.state().track();
        if playing.is_some() && playing != keep {
            self.with_playback(|player| player.stop());
        }
    }

    fn with_playback<R>(&mut self, f: impl FnOnce(&mut PlaybackController<S, T>) -> R) -> R {
        let before = self.player.state();
        let result = f(&mut self.player);
        if self.player.state() != before {
            self.notify_playback_changed();
        }
        result
    }

    fn commit(&mut self, command: Command) {
        log::info!("{} (track {})", command.label(), command.track_id());
        self.history.record(command);
        self.notify_tracks_changed();
    }

    fn report_error(&self, error: &SessionError) {
        if error.is_integrity_violation() {
            log::error!("{}", error);
        } else {
            log::warn!("{}", error);
        }
        if let Some(delegate) = &self.delegate {
            delegate.on_error(error);
        }
    }

    fn notify_recording_changed(&self) {
        if let Some(delegate) = &self.delegate {
            delegate.on_recording_state_changed(&self.recorder.state());
        }
    }

    fn notify_playback_changed(&self) {
        if let Some(delegate) = &self.delegate {
            delegate.on_playback_state_changed(&self.player.state(), self.player.offset());
        }
    }

    fn notify_tracks_changed(&self) {
        if let Some(delegate) = &self.delegate {
            delegate.on_tracks_changed(self.store.active());
        }
    }
}
