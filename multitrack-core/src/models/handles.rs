use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a capture device as understood by the capture source
/// (e.g. a browser `deviceId`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An open capture stream, issued by a `CaptureSource`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureHandle(pub u64);

/// A loaded, playable buffer, issued by an `AudioSink`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkHandle(pub u64);

/// A running periodic timer, issued by a `ClockTimer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);
