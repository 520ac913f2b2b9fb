use serde::{Deserialize, Serialize};

use super::track::TrackId;

/// Recording state machine.
///
/// ```text
/// idle → recording → idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RecordingState {
    Idle,
    Recording { track: TrackId },
}

impl RecordingState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }

    /// The track being recorded into, if any.
    pub fn track(&self) -> Option<TrackId> {
        match self {
            Self::Recording { track } => Some(*track),
            Self::Idle => None,
        }
    }
}

/// Playback state machine.
///
/// ```text
/// stopped → playing ⇄ paused
///    ↑         │         │
///    └─────────┴─────────┘   stop / end of audio
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PlaybackState {
    Stopped,
    Playing { track: TrackId },
    Paused { track: TrackId },
}

impl PlaybackState {
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused { .. })
    }

    /// The track loaded for playback, if any.
    pub fn track(&self) -> Option<TrackId> {
        match self {
            Self::Playing { track } | Self::Paused { track } => Some(*track),
            Self::Stopped => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing { .. } => "playing",
            Self::Paused { .. } => "paused",
        }
    }
}
