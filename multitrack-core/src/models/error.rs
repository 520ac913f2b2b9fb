use thiserror::Error;

use super::track::TrackId;

/// Errors reported by the session core.
///
/// None of these are fatal: after any of them the session is still in the
/// last valid state. `HistoryCorrupted` is the exception in kind, not in
/// effect: it means undo/redo bookkeeping broke, and the history has been
/// dropped so the damage cannot spread.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("capture device not available: {0}")]
    DeviceUnavailable(String),

    #[error("a recording is already in progress")]
    AlreadyRecording,

    #[error("no recording in progress")]
    NotRecording,

    #[error("no active track")]
    NoActiveTrack,

    #[error("track {0} has no recorded audio")]
    EmptyTrack(TrackId),

    #[error("track {0} not found")]
    NotFound(TrackId),

    #[error("track {track} has no effect at index {index}")]
    EffectNotFound { track: TrackId, index: usize },

    #[error("decode failed: {0}")]
    DecodeError(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("command history corrupted: {0}")]
    HistoryCorrupted(String),
}

impl SessionError {
    /// True for bookkeeping failures that indicate a bug rather than user misuse.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::HistoryCorrupted(_))
    }
}
