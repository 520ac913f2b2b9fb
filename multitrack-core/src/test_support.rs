//! In-memory providers for unit tests. Clones share state, so a test keeps
//! one clone to drive and inspect the provider it moved into the session.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::error::SessionError;
use crate::models::handles::{CaptureHandle, DeviceId, SinkHandle, TimerId};
use crate::models::track::AudioFragment;
use crate::traits::audio_sink::{AudioSink, CompletionCallback};
use crate::traits::capture_source::{CaptureCallback, CaptureEvent, CaptureSource};
use crate::traits::clock::{ClockTimer, TickCallback};

#[derive(Default)]
struct CaptureInner {
    next_handle: u64,
    unavailable: bool,
    current: Option<(CaptureHandle, CaptureCallback)>,
    opened: Vec<Option<DeviceId>>,
    close_calls: HashMap<CaptureHandle, usize>,
}

#[derive(Clone, Default)]
pub struct FakeCapture {
    inner: Arc<Mutex<CaptureInner>>,
}

impl FakeCapture {
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unavailable = unavailable;
    }

    /// Deliver a fragment on the open stream.
    pub fn emit(&self, bytes: &[u8]) {
        let (handle, callback) = self.current().expect("no open capture stream");
        callback(handle, CaptureEvent::Fragment(AudioFragment::from(bytes)));
    }

    /// End the open stream from the device side.
    pub fn end(&self, reason: &str) {
        let (handle, callback) = self.current().expect("no open capture stream");
        callback(
            handle,
            CaptureEvent::Ended {
                reason: reason.to_string(),
            },
        );
    }

    pub fn current_handle(&self) -> Option<CaptureHandle> {
        self.current().map(|(handle, _)| handle)
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().current.is_some()
    }

    pub fn close_count(&self, handle: CaptureHandle) -> usize {
        self.inner.lock().close_calls.get(&handle).copied().unwrap_or(0)
    }

    pub fn opened_devices(&self) -> Vec<Option<DeviceId>> {
        self.inner.lock().opened.clone()
    }

    fn current(&self) -> Option<(CaptureHandle, CaptureCallback)> {
        self.inner
            .lock()
            .current
            .as_ref()
            .map(|(handle, callback)| (*handle, Arc::clone(callback)))
    }
}

impl CaptureSource for FakeCapture {
    fn open(
        &mut self,
        device: Option<&DeviceId>,
        callback: CaptureCallback,
    ) -> Result<CaptureHandle, SessionError> {
        let mut inner = self.inner.lock();
        if inner.unavailable {
            return Err(SessionError::DeviceUnavailable("no input device".into()));
        }
        inner.next_handle += 1;
        let handle = CaptureHandle(inner.next_handle);
        inner.current = Some((handle, callback));
        inner.opened.push(device.cloned());
        Ok(handle)
    }

    fn close(&mut self, handle: CaptureHandle) {
        let mut inner = self.inner.lock();
        *inner.close_calls.entry(handle).or_insert(0) += 1;
        if inner.current.as_ref().map(|(h, _)| *h) == Some(handle) {
            inner.current = None;
        }
    }
}

struct SinkBuffer {
    fragments: Vec<AudioFragment>,
    on_complete: CompletionCallback,
    position: Duration,
    playing: bool,
}

#[derive(Default)]
struct SinkInner {
    next_handle: u64,
    buffers: HashMap<SinkHandle, SinkBuffer>,
    loads: usize,
    unloaded: Vec<SinkHandle>,
    fail_decode: bool,
}

#[derive(Clone, Default)]
pub struct FakeSink {
    inner: Arc<Mutex<SinkInner>>,
}

impl FakeSink {
    pub fn set_fail_decode(&self, fail: bool) {
        self.inner.lock().fail_decode = fail;
    }

    pub fn loads(&self) -> usize {
        self.inner.lock().loads
    }

    pub fn unloaded(&self) -> Vec<SinkHandle> {
        self.inner.lock().unloaded.clone()
    }

    pub fn playing_handle(&self) -> Option<SinkHandle> {
        self.inner
            .lock()
            .buffers
            .iter()
            .find(|(_, buffer)| buffer.playing)
            .map(|(handle, _)| *handle)
    }

    pub fn loaded_fragments(&self, handle: SinkHandle) -> Option<Vec<AudioFragment>> {
        self.inner.lock().buffers.get(&handle).map(|b| b.fragments.clone())
    }

    pub fn position(&self, handle: SinkHandle) -> Duration {
        self.inner
            .lock()
            .buffers
            .get(&handle)
            .map(|b| b.position)
            .unwrap_or_default()
    }

    /// Move the playing buffer forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut inner = self.inner.lock();
        for buffer in inner.buffers.values_mut().filter(|b| b.playing) {
            buffer.position += by;
        }
    }

    /// Reach the end of the playing buffer and fire its completion.
    pub fn finish(&self) {
        let fired = {
            let mut inner = self.inner.lock();
            inner
                .buffers
                .iter_mut()
                .find(|(_, buffer)| buffer.playing)
                .map(|(handle, buffer)| {
                    buffer.playing = false;
                    buffer.position = Duration::ZERO;
                    (*handle, Arc::clone(&buffer.on_complete))
                })
        };
        if let Some((handle, on_complete)) = fired {
            on_complete(handle);
        }
    }
}

impl AudioSink for FakeSink {
    fn load(
        &mut self,
        fragments: &[AudioFragment],
        on_complete: CompletionCallback,
    ) -> Result<SinkHandle, SessionError> {
        let mut inner = self.inner.lock();
        if inner.fail_decode {
            return Err(SessionError::DecodeError("unrecognized container".into()));
        }
        inner.loads += 1;
        inner.next_handle += 1;
        let handle = SinkHandle(inner.next_handle);
        inner.buffers.insert(
            handle,
            SinkBuffer {
                fragments: fragments.to_vec(),
                on_complete,
                position: Duration::ZERO,
                playing: false,
            },
        );
        Ok(handle)
    }

    fn play(&mut self, handle: SinkHandle) {
        if let Some(buffer) = self.inner.lock().buffers.get_mut(&handle) {
            buffer.playing = true;
        }
    }

    fn pause(&mut self, handle: SinkHandle) {
        if let Some(buffer) = self.inner.lock().buffers.get_mut(&handle) {
            buffer.playing = false;
        }
    }

    fn stop(&mut self, handle: SinkHandle) {
        if let Some(buffer) = self.inner.lock().buffers.get_mut(&handle) {
            buffer.playing = false;
            buffer.position = Duration::ZERO;
        }
    }

    fn seek(&mut self, handle: SinkHandle, offset: Duration) {
        if let Some(buffer) = self.inner.lock().buffers.get_mut(&handle) {
            buffer.position = offset;
        }
    }

    fn current_offset(&self, handle: SinkHandle) -> Duration {
        self.position(handle)
    }

    fn unload(&mut self, handle: SinkHandle) {
        let mut inner = self.inner.lock();
        inner.buffers.remove(&handle);
        inner.unloaded.push(handle);
    }
}

#[derive(Default)]
struct TimerInner {
    next_id: u64,
    running: HashMap<TimerId, TickCallback>,
    started: usize,
}

#[derive(Clone, Default)]
pub struct FakeTimer {
    inner: Arc<Mutex<TimerInner>>,
}

impl FakeTimer {
    /// Fire every running timer once.
    pub fn fire(&self) {
        let due: Vec<(TimerId, TickCallback)> = self
            .inner
            .lock()
            .running
            .iter()
            .map(|(id, callback)| (*id, Arc::clone(callback)))
            .collect();
        for (id, callback) in due {
            callback(id);
        }
    }

    pub fn running_count(&self) -> usize {
        self.inner.lock().running.len()
    }

    pub fn running_ids(&self) -> Vec<TimerId> {
        self.inner.lock().running.keys().copied().collect()
    }

    pub fn started(&self) -> usize {
        self.inner.lock().started
    }
}

impl ClockTimer for FakeTimer {
    fn start(&mut self, _interval: Duration, on_tick: TickCallback) -> TimerId {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = TimerId(inner.next_id);
        inner.running.insert(id, on_tick);
        inner.started += 1;
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.inner.lock().running.remove(&id);
    }
}
