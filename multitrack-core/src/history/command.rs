use std::fmt;

use crate::models::track::{Track, TrackId};
use crate::storage::track_store::{StoreError, TrackStore};

/// Which way a command is being replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Active track selection on either side of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub before: Option<TrackId>,
    pub after: Option<TrackId>,
}

impl Selection {
    pub fn unchanged(active: Option<TrackId>) -> Self {
        Self {
            before: active,
            after: active,
        }
    }
}

/// What an `EditTrack` command changed, for labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Record,
    Rename,
    Volume,
    Pan,
    Mute,
    Solo,
    AddEffect,
    RemoveEffect,
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Record => "Record",
            Self::Rename => "Rename Track",
            Self::Volume => "Change Volume",
            Self::Pan => "Change Pan",
            Self::Mute => "Toggle Mute",
            Self::Solo => "Toggle Solo",
            Self::AddEffect => "Add Effect",
            Self::RemoveEffect => "Remove Effect",
        })
    }
}

/// A reversible track mutation.
///
/// Each variant carries full track values, never references into the
/// store, so replaying it in either direction needs nothing but the store
/// itself. Replays never modify the command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddTrack {
        track: Track,
        index: usize,
        selection: Selection,
    },
    DeleteTrack {
        track: Track,
        /// Position at deletion time; undo re-inserts here.
        index: usize,
        selection: Selection,
    },
    EditTrack {
        before: Track,
        after: Track,
        kind: EditKind,
        selection: Selection,
    },
}

impl Command {
    /// The track this command is about.
    pub fn track_id(&self) -> TrackId {
        match self {
            Self::AddTrack { track, .. } | Self::DeleteTrack { track, .. } => track.id(),
            Self::EditTrack { after, .. } => after.id(),
        }
    }

    pub fn selection(&self) -> Selection {
        match self {
            Self::AddTrack { selection, .. }
            | Self::DeleteTrack { selection, .. }
            | Self::EditTrack { selection, .. } => *selection,
        }
    }

    /// Whether replaying this command can change or remove the audio of its
    /// track. Mixing and effect edits cannot.
    pub fn affects_audio(&self) -> bool {
        match self {
            Self::AddTrack { .. } | Self::DeleteTrack { .. } => true,
            Self::EditTrack { before, after, .. } => !before.same_audio(after),
        }
    }

    /// Short human-readable name, e.g. for "Undo Add Track".
    pub fn label(&self) -> String {
        match self {
            Self::AddTrack { .. } => "Add Track".to_string(),
            Self::DeleteTrack { .. } => "Delete Track".to_string(),
            Self::EditTrack { kind, .. } => kind.to_string(),
        }
    }

    /// Apply the command (redo).
    pub fn execute(&self, store: &mut TrackStore) -> Result<(), StoreError> {
        self.run(store, Direction::Forward)
    }

    /// Apply the inverse of the command (undo).
    pub fn rollback(&self, store: &mut TrackStore) -> Result<(), StoreError> {
        self.run(store, Direction::Reverse)
    }

    pub fn run(&self, store: &mut TrackStore, direction: Direction) -> Result<(), StoreError> {
        use Direction::*;

        match (self, direction) {
            (Self::AddTrack { track, index, .. }, Forward)
            | (Self::DeleteTrack { track, index, .. }, Reverse) => {
                store.insert_track(*index, track.clone())?;
            }
            (Self::AddTrack { track, .. }, Reverse)
            | (Self::DeleteTrack { track, .. }, Forward) => {
                store.remove_track(track.id())?;
            }
            (Self::EditTrack { after, .. }, Forward) => {
                store.replace_track(after.id(), after.clone())?;
            }
            (Self::EditTrack { before, .. }, Reverse) => {
                store.replace_track(before.id(), before.clone())?;
            }
        }

        let selection = self.selection();
        store.set_active(match direction {
            Forward => selection.after,
            Reverse => selection.before,
        })
    }
}
