use multitrack_core::{AudioSink, CaptureSource, ClockTimer, SessionController, SessionError};

use crate::chord::KeyEvent;
use crate::map::{Shortcut, ShortcutMap};

/// Run the session intent bound to `event`.
///
/// Returns the shortcut that fired, or `None` when the key is unbound and the
/// host should let it through. A bound key counts as handled even if the
/// intent had nothing to do (undo with empty history).
pub fn dispatch<C, S, T>(
    map: &ShortcutMap,
    session: &mut SessionController<C, S, T>,
    event: &KeyEvent,
) -> Result<Option<Shortcut>, SessionError>
where
    C: CaptureSource,
    S: AudioSink,
    T: ClockTimer,
{
    let Some(shortcut) = map.lookup(event) else {
        return Ok(None);
    };
    log::debug!("{:?} → {}", event, shortcut);

    match shortcut {
        Shortcut::TogglePlayback => session.toggle_playback()?,
        Shortcut::ToggleRecording => {
            session.toggle_recording()?;
        }
        Shortcut::Undo => {
            session.undo()?;
        }
        Shortcut::Redo => {
            session.redo()?;
        }
    }
    Ok(Some(shortcut))
}
