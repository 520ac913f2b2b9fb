use crate::models::error::SessionError;
use crate::models::handles::{CaptureHandle, DeviceId};
use crate::models::state::RecordingState;
use crate::models::track::{AudioFragment, TrackId};
use crate::traits::capture_source::{CaptureCallback, CaptureSource};

/// Result of a finished (or aborted) recording, ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedRecording {
    pub track: TrackId,
    /// Fragments in arrival order.
    pub fragments: Vec<AudioFragment>,
    /// Set when the stream ended on its own rather than through `stop`.
    pub aborted: Option<String>,
}

/// Drives a capture source for one track at a time.
///
/// ```text
/// idle → recording → idle
/// ```
///
/// The controller only accumulates; building the edited track and recording
/// history is left to the session.
pub struct RecordingController<C: CaptureSource> {
    source: C,
    state: RecordingState,
    handle: Option<CaptureHandle>,
    fragments: Vec<AudioFragment>,
}

impl<C: CaptureSource> RecordingController<C> {
    pub fn new(source: C) -> Self {
        Self {
            source,
            state: RecordingState::Idle,
            handle: None,
            fragments: Vec::new(),
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state.is_recording()
    }

    /// Track currently being recorded into.
    pub fn target(&self) -> Option<TrackId> {
        self.state.track()
    }

    /// Fragments accumulated so far in this recording.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn source(&self) -> &C {
        &self.source
    }

    /// Open the capture stream and start accumulating for `track`.
    ///
    /// Transitions: idle → recording. On failure the state stays idle.
    pub fn start(
        &mut self,
        track: TrackId,
        device: Option<&DeviceId>,
        callback: CaptureCallback,
    ) -> Result<(), SessionError> {
        if self.is_recording() {
            return Err(SessionError::AlreadyRecording);
        }

        let handle = self.source.open(device, callback).map_err(|e| match e {
            SessionError::DeviceUnavailable(_) => e,
            other => SessionError::DeviceUnavailable(other.to_string()),
        })?;

        self.fragments.clear();
        self.handle = Some(handle);
        self.state = RecordingState::Recording { track };
        log::info!(
            "recording into track {} (device: {})",
            track,
            device.map(DeviceId::as_str).unwrap_or("default")
        );
        Ok(())
    }

    /// Append a fragment from the open stream. Fragments from any other
    /// (already closed) stream are discarded. Returns whether it was kept.
    pub fn on_fragment(&mut self, handle: CaptureHandle, fragment: AudioFragment) -> bool {
        if self.handle != Some(handle) {
            log::debug!("dropping fragment from stale capture stream {:?}", handle);
            return false;
        }
        self.fragments.push(fragment);
        true
    }

    /// Close the stream and hand back what was captured.
    ///
    /// Transitions: recording → idle. `None` when not recording.
    pub fn stop(&mut self) -> Option<FinishedRecording> {
        self.finish(None)
    }

    /// The stream behind `handle` ended without `stop`. Closes it and hands
    /// back what was captured, like `stop`. `None` if `handle` is not the
    /// open stream.
    pub fn abort(&mut self, handle: CaptureHandle, reason: String) -> Option<FinishedRecording> {
        if self.handle != Some(handle) {
            return None;
        }
        log::warn!("capture stream ended unexpectedly: {}", reason);
        self.finish(Some(reason))
    }

    fn finish(&mut self, aborted: Option<String>) -> Option<FinishedRecording> {
        let track = self.state.track()?;
        if let Some(handle) = self.handle.take() {
            self.source.close(handle);
        }
        self.state = RecordingState::Idle;

        let fragments = std::mem::take(&mut self.fragments);
        log::info!("recording into track {} finished with {} fragments", track, fragments.len());
        Some(FinishedRecording {
            track,
            fragments,
            aborted,
        })
    }
}

impl<C: CaptureSource> Drop for RecordingController<C> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            log::debug!("closing capture stream {:?} on drop", handle);
            self.source.close(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::event_queue::{EventQueue, SessionEvent};
    use crate::test_support::FakeCapture;
    use crate::traits::capture_source::CaptureEvent;

    fn drain(queue: &EventQueue, recorder: &mut RecordingController<FakeCapture>) {
        while let Some(event) = queue.pop() {
            if let SessionEvent::Capture {
                handle,
                event: CaptureEvent::Fragment(fragment),
            } = event
            {
                recorder.on_fragment(handle, fragment);
            }
        }
    }

    #[test]
    fn start_then_stop_collects_in_order() {
        let capture = FakeCapture::default();
        let queue = EventQueue::new();
        let mut recorder = RecordingController::new(capture.clone());
        let track = TrackId::generate();

        recorder.start(track, None, queue.capture_callback()).unwrap();
        assert_eq!(recorder.state(), RecordingState::Recording { track });

        capture.emit(&[1]);
        capture.emit(&[2]);
        capture.emit(&[3]);
        drain(&queue, &mut recorder);

        let finished = recorder.stop().unwrap();
        assert_eq!(finished.track, track);
        assert_eq!(
            finished.fragments,
            vec![
                AudioFragment::from(vec![1u8]),
                AudioFragment::from(vec![2u8]),
                AudioFragment::from(vec![3u8]),
            ]
        );
        assert!(finished.aborted.is_none());
        assert!(recorder.state().is_idle());
    }

    #[test]
    fn unavailable_device_stays_idle() {
        let capture = FakeCapture::default();
        capture.set_unavailable(true);
        let mut recorder = RecordingController::new(capture);

        let err = recorder
            .start(TrackId::generate(), None, EventQueue::new().capture_callback())
            .unwrap_err();

        assert!(matches!(err, SessionError::DeviceUnavailable(_)));
        assert!(recorder.state().is_idle());
    }

    #[test]
    fn second_start_is_rejected() {
        let mut recorder = RecordingController::new(FakeCapture::default());
        let queue = EventQueue::new();
        let first = TrackId::generate();

        recorder.start(first, None, queue.capture_callback()).unwrap();
        let err = recorder.start(TrackId::generate(), None, queue.capture_callback());

        assert_eq!(err, Err(SessionError::AlreadyRecording));
        assert_eq!(recorder.target(), Some(first));
    }

    #[test]
    fn stop_while_idle_is_noop() {
        let capture = FakeCapture::default();
        let mut recorder = RecordingController::new(capture.clone());

        assert!(recorder.stop().is_none());
        assert!(capture.opened_devices().is_empty());
    }

    #[test]
    fn stale_fragments_are_dropped() {
        let capture = FakeCapture::default();
        let queue = EventQueue::new();
        let mut recorder = RecordingController::new(capture.clone());

        recorder.start(TrackId::generate(), None, queue.capture_callback()).unwrap();
        let old = capture.current_handle().unwrap();
        recorder.stop();
        recorder.start(TrackId::generate(), None, queue.capture_callback()).unwrap();

        assert!(!recorder.on_fragment(old, AudioFragment::from(vec![0u8])));
        assert_eq!(recorder.fragment_count(), 0);
    }

    #[test]
    fn handle_closed_exactly_once_on_stop() {
        let capture = FakeCapture::default();
        let mut recorder = RecordingController::new(capture.clone());

        recorder.start(TrackId::generate(), None, EventQueue::new().capture_callback()).unwrap();
        let handle = capture.current_handle().unwrap();
        recorder.stop();
        recorder.stop();

        assert_eq!(capture.close_count(handle), 1);
    }

    #[test]
    fn abort_closes_and_returns_fragments() {
        let capture = FakeCapture::default();
        let queue = EventQueue::new();
        let mut recorder = RecordingController::new(capture.clone());

        recorder.start(TrackId::generate(), None, queue.capture_callback()).unwrap();
        let handle = capture.current_handle().unwrap();
        capture.emit(&[4]);
        drain(&queue, &mut recorder);

        assert!(recorder.abort(CaptureHandle(999), "other".into()).is_none());
        let finished = recorder.abort(handle, "device removed".into()).unwrap();

        assert_eq!(finished.fragments.len(), 1);
        assert_eq!(finished.aborted.as_deref(), Some("device removed"));
        assert!(recorder.state().is_idle());
        assert_eq!(capture.close_count(handle), 1);
        assert!(recorder.stop().is_none());
        assert_eq!(capture.close_count(handle), 1);
    }

    #[test]
    fn drop_while_recording_closes_stream() {
        let capture = FakeCapture::default();
        let mut recorder = RecordingController::new(capture.clone());
        recorder.start(TrackId::generate(), None, EventQueue::new().capture_callback()).unwrap();
        let handle = capture.current_handle().unwrap();

        drop(recorder);

        assert_eq!(capture.close_count(handle), 1);
        assert!(!capture.is_open());
    }

    #[test]
    fn passes_device_to_source() {
        let capture = FakeCapture::default();
        let mut recorder = RecordingController::new(capture.clone());
        let device = DeviceId::from("usb-mic");

        recorder
            .start(TrackId::generate(), Some(&device), EventQueue::new().capture_callback())
            .unwrap();

        assert_eq!(capture.opened_devices(), vec![Some(device)]);
    }
}
