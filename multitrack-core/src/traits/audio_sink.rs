use std::sync::Arc;
use std::time::Duration;

use crate::models::error::SessionError;
use crate::models::handles::SinkHandle;
use crate::models::track::AudioFragment;

/// Callback an audio sink invokes when a play-through reaches the end of
/// the buffer. Fires once per play-through, never after `stop`.
pub type CompletionCallback = Arc<dyn Fn(SinkHandle) + Send + Sync + 'static>;

/// Provider of decoded, playable buffers (e.g. a Web Audio or Howler wrapper).
pub trait AudioSink: Send {
    /// Decode `fragments` (in order) into one playable buffer.
    ///
    /// Fails with `SessionError::DecodeError` if the data cannot be decoded.
    fn load(
        &mut self,
        fragments: &[AudioFragment],
        on_complete: CompletionCallback,
    ) -> Result<SinkHandle, SessionError>;

    fn play(&mut self, handle: SinkHandle);

    fn pause(&mut self, handle: SinkHandle);

    /// Halt playback and rewind to the start.
    fn stop(&mut self, handle: SinkHandle);

    fn seek(&mut self, handle: SinkHandle, offset: Duration);

    /// Current play position within the buffer.
    fn current_offset(&self, handle: SinkHandle) -> Duration;

    /// Release the buffer. The handle is not used again afterwards.
    fn unload(&mut self, handle: SinkHandle);
}
