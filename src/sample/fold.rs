//! Pitch folding — maps any pitch onto the subset that has a real recording.
//!
//! Only every third chromatic pitch is recorded. An unsampled pitch borrows
//! its nearest recorded neighbor, one semitone away, and compensates with a
//! playback-rate multiplier of 2^(±1/12).

/// Interval between recorded pitches, in semitones.
pub const SAMPLED_STRIDE: u8 = 3;

/// A pitch folded onto its recorded neighbor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Folding {
    /// The recorded pitch to fetch from the cache. Never the raw pitch for
    /// an unsampled note.
    pub key: u8,
    /// Playback-rate multiplier that shifts the recording to the requested
    /// pitch: 1.0, 2^(1/12), or 2^(-1/12).
    pub rate: f64,
}

/// Whether a recording exists for this exact pitch.
pub fn is_sampled(pitch: u8) -> bool {
    pitch % SAMPLED_STRIDE == 0
}

/// Fold a pitch onto the nearest recorded key.
pub fn fold(pitch: u8) -> Folding {
    let semitone = 2.0f64.powf(1.0 / 12.0);
    match pitch % SAMPLED_STRIDE {
        0 => Folding {
            key: pitch,
            rate: 1.0,
        },
        // One above a recorded pitch: play that recording a semitone faster.
        1 => Folding {
            key: pitch - 1,
            rate: semitone,
        },
        // One below the next recorded pitch: play it a semitone slower.
        _ => Folding {
            key: pitch + 1,
            rate: 1.0 / semitone,
        },
    }
}
