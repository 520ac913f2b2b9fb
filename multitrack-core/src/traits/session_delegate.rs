use std::time::Duration;

use crate::models::error::SessionError;
use crate::models::state::{PlaybackState, RecordingState};
use crate::models::track::TrackId;

/// Event delegate for session notifications.
///
/// Called synchronously from the session's own call sequence, after the
/// state change has been applied.
pub trait SessionDelegate: Send + Sync {
    /// Called when recording starts or stops.
    fn on_recording_state_changed(&self, state: &RecordingState);

    /// Called when playback starts, pauses, resumes or stops.
    fn on_playback_state_changed(&self, state: &PlaybackState, offset: Duration);

    /// Called on every accepted clock tick while playing.
    fn on_playback_position(&self, offset: Duration);

    /// Called after the track list, a track, or the active selection changed.
    fn on_tracks_changed(&self, active: Option<TrackId>);

    /// Called for errors that happen while handling queued events, where no
    /// caller is around to receive a `Result`.
    fn on_error(&self, error: &SessionError);
}
