//! Key map — maps a physical keyboard row to piano keys around a movable octave.
//!
//! A fixed 13-entry binding covers one octave and a bit of a QWERTY row,
//! anchored so that binding index 3 is the C of the currently selected octave.
//! The three entries below the anchor spill into the previous octave.

use crossterm::event::KeyCode;
use std::sync::Arc;

use crate::note::{NoteCatalog, PianoKey};

/// Physical-key bindings in chromatic order, A below the anchor C through the
/// A above it. White notes sit on the bottom letter row, accidentals on the
/// row above, mirroring the piano's black-key positions.
pub const BINDINGS: [KeyCode; 13] = [
    KeyCode::Char('z'), // A  (previous octave)
    KeyCode::Char('s'), // A#
    KeyCode::Char('x'), // B
    KeyCode::Char('c'), // C  (anchor)
    KeyCode::Char('f'), // C#
    KeyCode::Char('v'), // D
    KeyCode::Char('g'), // D#
    KeyCode::Char('b'), // E
    KeyCode::Char('n'), // F
    KeyCode::Char('j'), // F#
    KeyCode::Char('m'), // G
    KeyCode::Char('k'), // G#
    KeyCode::Char(','), // A
];

/// Binding index of the anchor C.
const ANCHOR: i32 = 3;

/// Resolves physical-keyboard input to piano keys and back.
///
/// The current octave is owned by the caller (UI state) and passed on every
/// call; the map itself is stateless. Localizing the returned [`KeyCode`] to
/// the user's layout is the caller's presentation concern.
#[derive(Debug, Clone)]
pub struct KeyMap {
    catalog: Arc<NoteCatalog>,
}

impl KeyMap {
    pub fn new(catalog: Arc<NoteCatalog>) -> Self {
        Self { catalog }
    }

    /// Resolve a physical key to a piano key, relative to `current_octave`.
    ///
    /// Returns None for keys outside the binding table (not an error; the
    /// caller ignores the event) and for pitches falling off the keyboard.
    pub fn resolve_key(&self, code: KeyCode, current_octave: i32) -> Option<&PianoKey> {
        let index = BINDINGS.iter().position(|&b| b == code)? as i32;
        let note_index = index - ANCHOR;
        // div_euclid/rem_euclid keep the spill below C in the previous octave.
        let octave = current_octave + note_index.div_euclid(12);
        let step = note_index.rem_euclid(12) as u8;
        self.catalog.by_position(octave, step)
    }

    /// Inverse of [`resolve_key`]: the binding that would trigger `key` with
    /// the given octave selected, or None when the key is out of the row's
    /// reach without shifting octaves.
    ///
    /// [`resolve_key`]: KeyMap::resolve_key
    pub fn label_for_key(&self, key: &PianoKey, current_octave: i32) -> Option<KeyCode> {
        let note_index = key.step() as i32 + (key.octave - current_octave) * 12;
        let index = note_index + ANCHOR;
        if (0..BINDINGS.len() as i32).contains(&index) {
            Some(BINDINGS[index as usize])
        } else {
            None
        }
    }
}
