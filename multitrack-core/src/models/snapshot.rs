use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::state::{PlaybackState, RecordingState};
use super::track::{Track, TrackId};
use crate::processing::timing;

/// Render-ready view of one track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSummary {
    pub id: TrackId,
    pub name: String,
    pub fragment_count: usize,
    pub duration_ms: u64,
    /// `mm:ss`
    pub duration_display: String,
    pub volume: f32,
    pub pan: f32,
    pub muted: bool,
    pub soloed: bool,
    pub effects: Vec<String>,
    pub is_active: bool,
    pub is_recording: bool,
}

impl TrackSummary {
    pub fn new(
        track: &Track,
        fragment_interval: Duration,
        is_active: bool,
        is_recording: bool,
    ) -> Self {
        let duration = track.duration(fragment_interval);
        let mix = track.mix();
        Self {
            id: track.id(),
            name: track.name().to_string(),
            fragment_count: track.fragment_count(),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            duration_display: timing::format_mm_ss(duration),
            volume: mix.volume,
            pan: mix.pan,
            muted: mix.muted,
            soloed: mix.soloed,
            effects: track.effects().iter().map(|e| e.name().to_string()).collect(),
            is_active,
            is_recording,
        }
    }
}

/// Complete session view handed to the presentation layer after each change.
///
/// Serializable for JSON export over whatever bridge the UI uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub tracks: Vec<TrackSummary>,
    pub active_track: Option<TrackId>,
    pub recording: RecordingState,
    pub playback: PlaybackState,
    pub playback_offset_ms: u64,
    /// `mm:ss`
    pub playback_offset_display: String,
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_label: Option<String>,
    pub redo_label: Option<String>,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
