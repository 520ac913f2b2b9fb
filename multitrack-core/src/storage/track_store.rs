use std::collections::HashMap;

use thiserror::Error;

use crate::models::error::SessionError;
use crate::models::track::{Track, TrackId};

/// Failures of track store operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    #[error("track {0} not found")]
    NotFound(TrackId),

    /// Only reachable by re-inserting a track whose id is still present,
    /// which correct history bookkeeping never does.
    #[error("track {0} already present")]
    Duplicate(TrackId),

    /// A replacement must carry the id of the track it replaces.
    #[error("replacement for track {expected} carries id {found}")]
    IdMismatch { expected: TrackId, found: TrackId },
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => SessionError::NotFound(id),
            StoreError::Duplicate(_) | StoreError::IdMismatch { .. } => {
                SessionError::HistoryCorrupted(err.to_string())
            }
        }
    }
}

/// Ordered, in-memory set of tracks plus the active selection.
///
/// Order is insertion order. An id → position map keeps lookups O(1);
/// positions are re-indexed only on insert and remove.
#[derive(Debug)]
pub struct TrackStore {
    tracks: Vec<Track>,
    positions: HashMap<TrackId, usize>,
    active: Option<TrackId>,
    name_prefix: String,
}

impl TrackStore {
    pub fn new(name_prefix: impl Into<String>) -> Self {
        Self {
            tracks: Vec::new(),
            positions: HashMap::new(),
            active: None,
            name_prefix: name_prefix.into(),
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.positions.contains_key(&id)
    }

    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.positions.get(&id).map(|&index| &self.tracks[index])
    }

    pub fn position(&self, id: TrackId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn active(&self) -> Option<TrackId> {
        self.active
    }

    pub fn active_track(&self) -> Option<&Track> {
        self.active.and_then(|id| self.get(id))
    }

    /// Append a track and make it active.
    ///
    /// Without `initial`, the track gets a fresh id, the name
    /// `"{prefix} {count + 1}"` and no audio. An `initial` value is appended
    /// as is, unless its id is already taken, in which case it is given a
    /// fresh one so ids stay unique.
    pub fn add_track(&mut self, initial: Option<Track>) -> Track {
        let track = match initial {
            Some(track) if self.contains(track.id()) => {
                log::warn!("track id {} already present, assigning a new id", track.id());
                Track::new(TrackId::generate(), track.name())
                    .with_fragments(track.fragments().to_vec())
                    .with_mix(track.mix())
                    .with_effects(track.effects().to_vec())
            }
            Some(track) => track,
            None => Track::new(
                TrackId::generate(),
                format!("{} {}", self.name_prefix, self.tracks.len() + 1),
            ),
        };

        self.positions.insert(track.id(), self.tracks.len());
        self.tracks.push(track.clone());
        self.active = Some(track.id());
        log::debug!("added track {} ({})", track.id(), track.name());
        track
    }

    /// Insert a track at `index` (clamped to the end). Returns the actual
    /// position. Does not touch the active selection.
    pub fn insert_track(&mut self, index: usize, track: Track) -> Result<usize, StoreError> {
        if self.contains(track.id()) {
            return Err(StoreError::Duplicate(track.id()));
        }
        let index = index.min(self.tracks.len());
        self.tracks.insert(index, track);
        self.reindex_from(index);
        Ok(index)
    }

    /// Remove a track, returning its former position and value.
    ///
    /// Clears the active selection if the removed track was active.
    pub fn remove_track(&mut self, id: TrackId) -> Result<(usize, Track), StoreError> {
        let index = self.positions.remove(&id).ok_or(StoreError::NotFound(id))?;
        let track = self.tracks.remove(index);
        self.reindex_from(index);
        if self.active == Some(id) {
            self.active = None;
        }
        log::debug!("removed track {} from position {}", id, index);
        Ok((index, track))
    }

    /// Substitute the track stored under `id` with `track`, in place.
    /// Returns the previous value.
    ///
    /// `track` must carry the same id; identity never changes. A track with
    /// a different id is rejected and the store is left untouched.
    pub fn replace_track(&mut self, id: TrackId, track: Track) -> Result<Track, StoreError> {
        let index = *self.positions.get(&id).ok_or(StoreError::NotFound(id))?;
        if track.id() != id {
            return Err(StoreError::IdMismatch {
                expected: id,
                found: track.id(),
            });
        }
        Ok(std::mem::replace(&mut self.tracks[index], track))
    }

    /// Select a track, or clear the selection with `None`.
    pub fn set_active(&mut self, id: Option<TrackId>) -> Result<(), StoreError> {
        if let Some(id) = id {
            if !self.contains(id) {
                return Err(StoreError::NotFound(id));
            }
        }
        self.active = id;
        Ok(())
    }

    fn reindex_from(&mut self, start: usize) {
        for (index, track) in self.tracks.iter().enumerate().skip(start) {
            self.positions.insert(track.id(), index);
        }
    }
}

impl Default for TrackStore {
    fn default() -> Self {
        Self::new("Track")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::track::AudioFragment;

    fn ids(store: &TrackStore) -> Vec<TrackId> {
        store.tracks().iter().map(Track::id).collect()
    }

    #[test]
    fn add_names_appends_and_activates() {
        let mut store = TrackStore::default();
        let first = store.add_track(None);
        let second = store.add_track(None);

        assert_eq!(first.name(), "Track 1");
        assert_eq!(second.name(), "Track 2");
        assert_eq!(ids(&store), vec![first.id(), second.id()]);
        assert_eq!(store.active(), Some(second.id()));
        assert!(first.fragments().is_empty());
    }

    #[test]
    fn add_uses_configured_prefix() {
        let mut store = TrackStore::new("Take");
        assert_eq!(store.add_track(None).name(), "Take 1");
    }

    #[test]
    fn add_with_initial_keeps_identity() {
        let mut store = TrackStore::default();
        let track = Track::new(TrackId::generate(), "Imported");

        let added = store.add_track(Some(track.clone()));

        assert_eq!(added, track);
        assert_eq!(store.get(track.id()), Some(&track));
    }

    #[test]
    fn add_with_taken_id_gets_fresh_id() {
        let mut store = TrackStore::default();
        let existing = store.add_track(None);

        let added = store.add_track(Some(existing.clone()));

        assert_ne!(added.id(), existing.id());
        assert_eq!(added.name(), existing.name());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_reports_position_and_clears_active() {
        let mut store = TrackStore::default();
        let a = store.add_track(None);
        let b = store.add_track(None);

        let (index, removed) = store.remove_track(b.id()).unwrap();

        assert_eq!(index, 1);
        assert_eq!(removed.id(), b.id());
        assert_eq!(store.active(), None);
        assert_eq!(ids(&store), vec![a.id()]);
    }

    #[test]
    fn remove_inactive_keeps_selection() {
        let mut store = TrackStore::default();
        let a = store.add_track(None);
        let b = store.add_track(None);

        store.remove_track(a.id()).unwrap();

        assert_eq!(store.active(), Some(b.id()));
        assert_eq!(store.position(b.id()), Some(0));
    }

    #[test]
    fn remove_missing_is_not_found() {
        let mut store = TrackStore::default();
        let ghost = TrackId::generate();
        assert_eq!(store.remove_track(ghost), Err(StoreError::NotFound(ghost)));
    }

    #[test]
    fn insert_restores_position() {
        let mut store = TrackStore::default();
        let a = store.add_track(None);
        let b = store.add_track(None);
        let c = store.add_track(None);

        let (index, removed) = store.remove_track(b.id()).unwrap();
        store.insert_track(index, removed).unwrap();

        assert_eq!(ids(&store), vec![a.id(), b.id(), c.id()]);
        assert_eq!(store.position(c.id()), Some(2));
    }

    #[test]
    fn insert_clamps_index_and_rejects_duplicates() {
        let mut store = TrackStore::default();
        let a = store.add_track(None);
        let loose = Track::new(TrackId::generate(), "loose");

        assert_eq!(store.insert_track(99, loose.clone()), Ok(1));
        assert_eq!(store.insert_track(0, a.clone()), Err(StoreError::Duplicate(a.id())));
    }

    #[test]
    fn replace_keeps_position_and_returns_previous() {
        let mut store = TrackStore::default();
        let a = store.add_track(None);
        let b = store.add_track(None);
        let recorded = a.with_fragments(vec![AudioFragment::from(vec![1u8])]);

        let previous = store.replace_track(a.id(), recorded.clone()).unwrap();

        assert_eq!(previous, a);
        assert_eq!(ids(&store), vec![a.id(), b.id()]);
        assert_eq!(store.get(a.id()), Some(&recorded));
    }

    #[test]
    fn replace_missing_is_not_found() {
        let mut store = TrackStore::default();
        let ghost = Track::new(TrackId::generate(), "ghost");
        assert_eq!(
            store.replace_track(ghost.id(), ghost.clone()),
            Err(StoreError::NotFound(ghost.id()))
        );
    }

    #[test]
    fn replace_with_foreign_id_is_rejected() {
        let mut store = TrackStore::default();
        let a = store.add_track(None);
        let b = store.add_track(None);
        let stranger = Track::new(TrackId::generate(), "stranger");

        assert_eq!(
            store.replace_track(a.id(), stranger.clone()),
            Err(StoreError::IdMismatch {
                expected: a.id(),
                found: stranger.id(),
            })
        );
        assert_eq!(store.get(a.id()), Some(&a));
        assert_eq!(store.get(stranger.id()), None);
        assert_eq!(ids(&store), vec![a.id(), b.id()]);
    }

    #[test]
    fn set_active_validates_id() {
        let mut store = TrackStore::default();
        let a = store.add_track(None);
        let ghost = TrackId::generate();

        assert_eq!(store.set_active(Some(ghost)), Err(StoreError::NotFound(ghost)));
        assert_eq!(store.active(), Some(a.id()));

        store.set_active(None).unwrap();
        assert_eq!(store.active(), None);
        assert!(store.active_track().is_none());
    }

    #[test]
    fn store_errors_map_to_session_errors() {
        let id = TrackId::generate();
        assert_eq!(SessionError::from(StoreError::NotFound(id)), SessionError::NotFound(id));
        assert!(SessionError::from(StoreError::Duplicate(id)).is_integrity_violation());
        let mismatch = StoreError::IdMismatch {
            expected: id,
            found: TrackId::generate(),
        };
        assert!(SessionError::from(mismatch).is_integrity_violation());
    }
}
