use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::processing::timing;

/// Stable identity of a track. Assigned once, never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(Uuid);

impl TrackId {
    /// Allocate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for TrackId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One chunk of encoded audio exactly as the capture source delivered it.
///
/// The payload is shared and immutable, so cloning a fragment (or a whole
/// track) never aliases mutable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFragment {
    data: Arc<[u8]>,
}

impl AudioFragment {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self { data: data.into() }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<u8>> for AudioFragment {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for AudioFragment {
    fn from(data: &[u8]) -> Self {
        Self::new(data)
    }
}

/// Per-track mixing attributes. Stored and edited by the core, never applied by it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixSettings {
    /// Linear gain, 0.0–1.0.
    pub volume: f32,
    /// Stereo position, -1.0 (left) to 1.0 (right).
    pub pan: f32,
    pub muted: bool,
    pub soloed: bool,
}

impl MixSettings {
    pub const MIN_VOLUME: f32 = 0.0;
    pub const MAX_VOLUME: f32 = 1.0;
    pub const MIN_PAN: f32 = -1.0;
    pub const MAX_PAN: f32 = 1.0;

    /// Copy with `volume` clamped into range. NaN maps to silence.
    pub fn with_volume(self, volume: f32) -> Self {
        let volume = if volume.is_nan() {
            Self::MIN_VOLUME
        } else {
            volume.clamp(Self::MIN_VOLUME, Self::MAX_VOLUME)
        };
        Self { volume, ..self }
    }

    /// Copy with `pan` clamped into range. NaN maps to center.
    pub fn with_pan(self, pan: f32) -> Self {
        let pan = if pan.is_nan() {
            0.0
        } else {
            pan.clamp(Self::MIN_PAN, Self::MAX_PAN)
        };
        Self { pan, ..self }
    }
}

impl Default for MixSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pan: 0.0,
            muted: false,
            soloed: false,
        }
    }
}

/// Opaque effect entry (e.g. "Reverb"). The core keeps the list, nothing more.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectTag(String);

impl EffectTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EffectTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for EffectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named sequence of recorded fragments plus its mixing attributes.
///
/// Tracks are values: every `with_*` method returns a new track with the same
/// id and leaves `self` untouched. History entries hold these values directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    id: TrackId,
    name: String,
    fragments: Arc<[AudioFragment]>,
    mix: MixSettings,
    effects: Vec<EffectTag>,
}

impl Track {
    /// An empty track with default mixing.
    pub fn new(id: TrackId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            fragments: Arc::from(Vec::new()),
            mix: MixSettings::default(),
            effects: Vec::new(),
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fragments(&self) -> &[AudioFragment] {
        &self.fragments
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn has_audio(&self) -> bool {
        !self.fragments.is_empty()
    }

    pub fn mix(&self) -> MixSettings {
        self.mix
    }

    pub fn effects(&self) -> &[EffectTag] {
        &self.effects
    }

    /// Length of the recorded audio given the fixed per-fragment interval.
    pub fn duration(&self, fragment_interval: Duration) -> Duration {
        timing::track_duration(self.fragments.len(), fragment_interval)
    }

    /// Whether both values share the same fragment buffer, i.e. the audio did
    /// not change between them.
    pub fn same_audio(&self, other: &Track) -> bool {
        Arc::ptr_eq(&self.fragments, &other.fragments) || self.fragments == other.fragments
    }

    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn with_fragments(&self, fragments: Vec<AudioFragment>) -> Self {
        Self {
            fragments: Arc::from(fragments),
            ..self.clone()
        }
    }

    pub fn with_mix(&self, mix: MixSettings) -> Self {
        Self { mix, ..self.clone() }
    }

    pub fn with_effects(&self, effects: Vec<EffectTag>) -> Self {
        Self {
            effects,
            ..self.clone()
        }
    }
}
