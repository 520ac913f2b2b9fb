use std::sync::Arc;

use crate::models::error::SessionError;
use crate::models::handles::{CaptureHandle, DeviceId};
use crate::models::track::AudioFragment;

/// Something a capture stream reports after it has been opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// A chunk of encoded audio, in capture order.
    Fragment(AudioFragment),
    /// The stream ended without being closed (device unplugged, permission
    /// revoked, track ended by the browser).
    Ended { reason: String },
}

/// Callback a capture source invokes for every event on an open stream.
///
/// May fire from any thread; implementations of the session core only
/// enqueue here and handle the event later on the session's own sequence.
pub type CaptureCallback = Arc<dyn Fn(CaptureHandle, CaptureEvent) + Send + Sync + 'static>;

/// Provider of audio input streams (e.g. `getUserMedia` + `MediaRecorder`).
pub trait CaptureSource: Send {
    /// Open a stream on `device`, or the default input when `None`.
    ///
    /// Fails with `SessionError::DeviceUnavailable` when no device can be
    /// opened or permission is denied.
    fn open(
        &mut self,
        device: Option<&DeviceId>,
        callback: CaptureCallback,
    ) -> Result<CaptureHandle, SessionError>;

    /// Stop the stream and release the device. Must be idempotent.
    fn close(&mut self, handle: CaptureHandle);
}
