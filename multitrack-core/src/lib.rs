//! # multitrack-core
//!
//! Platform-agnostic session core for a multi-track audio recorder.
//!
//! Owns the ordered track list, the undo/redo history of track commands, and
//! the recording and playback state machines. Capture devices, audio output
//! and the position clock are injected through the `CaptureSource`,
//! `AudioSink` and `ClockTimer` traits; their callbacks only enqueue events,
//! which `SessionController::process_events` handles on the owner's thread.
//!
//! ## Architecture
//!
//! ```text
//! multitrack-core (this crate)
//! ├── traits/       ← CaptureSource, AudioSink, ClockTimer, SessionDelegate
//! ├── models/       ← Track, SessionError, RecordingState, PlaybackState,
//! │                   SessionConfiguration, snapshot
//! ├── processing/   ← EventQueue, duration arithmetic and mm:ss formatting
//! ├── storage/      ← TrackStore (ordered tracks + active selection)
//! ├── history/      ← Command, CommandHistory
//! └── session/      ← SessionController, RecordingController, PlaybackController
//! ```

pub mod history;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod test_support;

// Re-export key types at crate root for convenience.
pub use history::command::{Command, EditKind, Selection};
pub use history::command_history::{CommandHistory, HistoryEntry};
pub use models::config::SessionConfiguration;
pub use models::error::SessionError;
pub use models::handles::{CaptureHandle, DeviceId, SinkHandle, TimerId};
pub use models::snapshot::{SessionSnapshot, TrackSummary};
pub use models::state::{PlaybackState, RecordingState};
pub use models::track::{AudioFragment, EffectTag, MixSettings, Track, TrackId};
pub use processing::event_queue::{EventQueue, SessionEvent};
pub use session::controller::SessionController;
pub use storage::track_store::TrackStore;
pub use traits::audio_sink::{AudioSink, CompletionCallback};
pub use traits::capture_source::{CaptureCallback, CaptureEvent, CaptureSource};
pub use traits::clock::{ClockTimer, TickCallback};
pub use traits::session_delegate::SessionDelegate;
