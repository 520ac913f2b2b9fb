//! # multitrack-shortcuts
//!
//! Keyboard shortcuts for the multitrack session.
//!
//! Provides:
//! - `KeyEvent` / `KeyChord`: key presses and the chords they are matched against
//! - `ShortcutMap`: chord bindings, defaulting to Space, R, Ctrl+Z and Ctrl+Shift+Z
//! - `dispatch`: runs the bound intent on a `SessionController`
//!
//! Only the controller's public intents are reachable from here.
//!
//! ## Usage
//! ```ignore
//! use multitrack_shortcuts::{dispatch, Key, KeyEvent, ShortcutMap};
//!
//! let map = ShortcutMap::default();
//! if dispatch(&map, &mut session, &KeyEvent::plain(Key::Space))?.is_some() {
//!     // consumed; suppress the host's default handling
//! }
//! ```

pub mod chord;
pub mod dispatch;
pub mod map;

pub use chord::{Key, KeyChord, KeyEvent, Modifiers, ParseChordError};
pub use dispatch::dispatch;
pub use map::{Shortcut, ShortcutMap};
