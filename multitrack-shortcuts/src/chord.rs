use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Physical key, independent of layout-specific text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    /// A letter or digit key, stored uppercase.
    Char(char),
    /// Any other key by its name ("Enter", "F5", ...).
    Named(String),
}

impl Key {
    /// Letter keys compare case-insensitively.
    pub fn char(c: char) -> Self {
        Self::Char(c.to_ascii_uppercase())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Space => write!(f, "Space"),
            Self::Char(c) => write!(f, "{}", c),
            Self::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        meta: false,
        shift: false,
        alt: false,
    };

    /// Ctrl on Windows/Linux, Cmd on macOS.
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key press as delivered by the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Press of `key` with no modifiers.
    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseChordError {
    #[error("empty key chord")]
    Empty,

    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),

    #[error("key chord '{0}' names no key")]
    MissingKey(String),

    #[error("key chord '{0}' names more than one key")]
    MultipleKeys(String),
}

/// A key plus the modifiers that must be held, e.g. `Ctrl+Shift+Z`.
///
/// `Ctrl` and `Cmd` are the same platform command modifier. Shift must match
/// exactly and chords never match while Alt is held.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: Key,
    pub command: bool,
    pub shift: bool,
}

impl KeyChord {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            command: false,
            shift: false,
        }
    }

    pub fn with_command(mut self) -> Self {
        self.command = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        let m = event.modifiers;
        event.key == self.key && m.command() == self.command && m.shift == self.shift && !m.alt
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.command {
            write!(f, "Ctrl+")?;
        }
        if self.shift {
            write!(f, "Shift+")?;
        }
        write!(f, "{}", self.key)
    }
}

impl FromStr for KeyChord {
    type Err = ParseChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ParseChordError::Empty);
        }

        let mut key = None;
        let mut command = false;
        let mut shift = false;

        for part in s.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "cmd" | "command" | "meta" => command = true,
                "shift" => shift = true,
                "alt" | "option" => return Err(ParseChordError::UnknownModifier(part.to_string())),
                "" => return Err(ParseChordError::MissingKey(s.to_string())),
                "space" => {
                    if key.replace(Key::Space).is_some() {
                        return Err(ParseChordError::MultipleKeys(s.to_string()));
                    }
                }
                _ => {
                    let mut chars = part.chars();
                    let parsed = match (chars.next(), chars.next()) {
                        (Some(c), None) => Key::char(c),
                        _ => Key::Named(part.to_string()),
                    };
                    if key.replace(parsed).is_some() {
                        return Err(ParseChordError::MultipleKeys(s.to_string()));
                    }
                }
            }
        }

        let key = key.ok_or_else(|| ParseChordError::MissingKey(s.to_string()))?;
        Ok(Self { key, command, shift })
    }
}
