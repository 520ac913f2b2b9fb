use std::fmt;

use crate::chord::{Key, KeyChord, KeyEvent};

/// Session actions reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shortcut {
    TogglePlayback,
    ToggleRecording,
    Undo,
    Redo,
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TogglePlayback => "toggle playback",
            Self::ToggleRecording => "toggle recording",
            Self::Undo => "undo",
            Self::Redo => "redo",
        };
        f.write_str(name)
    }
}

/// Key chord to shortcut bindings. Each chord maps to at most one shortcut;
/// a shortcut may have several chords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutMap {
    bindings: Vec<(KeyChord, Shortcut)>,
}

impl Default for ShortcutMap {
    /// Space, R, Ctrl/Cmd+Z and Ctrl/Cmd+Shift+Z.
    fn default() -> Self {
        let mut map = Self::empty();
        map.bind(KeyChord::new(Key::Space), Shortcut::TogglePlayback);
        map.bind(KeyChord::new(Key::Char('R')), Shortcut::ToggleRecording);
        map.bind(KeyChord::new(Key::Char('Z')).with_command(), Shortcut::Undo);
        map.bind(KeyChord::new(Key::Char('Z')).with_command().with_shift(), Shortcut::Redo);
        map
    }
}

impl ShortcutMap {
    pub fn empty() -> Self {
        Self { bindings: Vec::new() }
    }

    /// Bind `chord`, replacing whatever it was bound to. Returns the
    /// previous shortcut.
    pub fn bind(&mut self, chord: KeyChord, shortcut: Shortcut) -> Option<Shortcut> {
        if let Some(entry) = self.bindings.iter_mut().find(|(c, _)| *c == chord) {
            return Some(std::mem::replace(&mut entry.1, shortcut));
        }
        self.bindings.push((chord, shortcut));
        None
    }

    pub fn unbind(&mut self, chord: &KeyChord) -> Option<Shortcut> {
        let index = self.bindings.iter().position(|(c, _)| c == chord)?;
        Some(self.bindings.remove(index).1)
    }

    pub fn lookup(&self, event: &KeyEvent) -> Option<Shortcut> {
        self.bindings
            .iter()
            .find(|(chord, _)| chord.matches(event))
            .map(|(_, shortcut)| *shortcut)
    }

    /// Chords bound to `shortcut`, in binding order.
    pub fn chords_for(&self, shortcut: Shortcut) -> impl Iterator<Item = &KeyChord> {
        self.bindings
            .iter()
            .filter(move |(_, s)| *s == shortcut)
            .map(|(chord, _)| chord)
    }

    pub fn bindings(&self) -> &[(KeyChord, Shortcut)] {
        &self.bindings
    }
}
