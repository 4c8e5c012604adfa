//! Note catalog — the 88 fixed keys of a standard piano keyboard.

pub mod pitch;

pub use pitch::pitch_to_frequency;

/// Lowest pitch on an 88-key piano (A0).
pub const LOWEST_PITCH: u8 = 21;
/// Highest pitch on an 88-key piano (C8).
pub const HIGHEST_PITCH: u8 = 108;
/// Number of keys on a standard piano.
pub const KEY_COUNT: usize = 88;

/// Enharmonic spellings for each chromatic step, indexed from C.
/// Accidentals carry both the sharp and the flat name.
const SPELLINGS: [&[&str]; 12] = [
    &["C"],
    &["C#", "Db"],
    &["D"],
    &["D#", "Eb"],
    &["E"],
    &["F"],
    &["F#", "Gb"],
    &["G"],
    &["G#", "Ab"],
    &["A"],
    &["A#", "Bb"],
    &["B"],
];

/// One physical key of the piano. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PianoKey {
    /// Absolute pitch in MIDI numbering (A0 = 21 .. C8 = 108).
    pub pitch: u8,
    /// Enharmonic spellings, e.g. `["C#", "Db"]`. Naturals have one entry.
    pub names: &'static [&'static str],
    /// Scientific octave number (C4 = middle C = pitch 60).
    pub octave: i32,
    /// True for the black keys (sharp/flat spellings).
    pub is_accidental: bool,
}

impl PianoKey {
    /// The preferred (sharp-side) spelling.
    pub fn name(&self) -> &'static str {
        self.names[0]
    }

    /// Chromatic step within the octave, counted from C (0..12).
    pub fn step(&self) -> u8 {
        self.pitch % 12
    }

    /// Display label like `"C4"` or `"F#3"`.
    pub fn label(&self) -> String {
        format!("{}{}", self.name(), self.octave)
    }
}

/// Static data for all 88 keys, built once at startup.
#[derive(Debug, Clone)]
pub struct NoteCatalog {
    keys: Vec<PianoKey>,
}

impl NoteCatalog {
    /// Build the standard 88-key catalog: the chromatic cycle starting at A0,
    /// with scientific octave numbering.
    pub fn standard() -> Self {
        let keys = (LOWEST_PITCH..=HIGHEST_PITCH)
            .map(|pitch| {
                let step = (pitch % 12) as usize;
                let names = SPELLINGS[step];
                PianoKey {
                    pitch,
                    names,
                    octave: pitch as i32 / 12 - 1,
                    is_accidental: names.len() > 1,
                }
            })
            .collect();
        Self { keys }
    }

    /// Look up a key by absolute pitch. None outside the 88-key range.
    pub fn get(&self, pitch: u8) -> Option<&PianoKey> {
        if !(LOWEST_PITCH..=HIGHEST_PITCH).contains(&pitch) {
            return None;
        }
        self.keys.get((pitch - LOWEST_PITCH) as usize)
    }

    /// Look up a key by octave and chromatic step from C.
    pub fn by_position(&self, octave: i32, step: u8) -> Option<&PianoKey> {
        let pitch = (octave + 1) * 12 + step as i32;
        u8::try_from(pitch).ok().and_then(|p| self.get(p))
    }

    /// Whether a pitch falls on the keyboard.
    pub fn contains(&self, pitch: u8) -> bool {
        (LOWEST_PITCH..=HIGHEST_PITCH).contains(&pitch)
    }

    /// All keys in ascending pitch order.
    pub fn iter(&self) -> impl Iterator<Item = &PianoKey> {
        self.keys.iter()
    }

    /// Number of keys (always 88).
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Never true for the standard catalog.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for NoteCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
