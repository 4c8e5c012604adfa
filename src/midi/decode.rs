//! MIDI message decoding — normalizes channel messages to note-on/note-off.
//!
//! Only note messages are of interest; velocity is deliberately discarded so
//! every input transport reduces to the same on/off stream.

/// Whether a note event starts or ends a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    On,
    Off,
}

/// A normalized note event: the single stream the voice engine consumes,
/// regardless of which transport produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub kind: NoteKind,
    /// Absolute pitch. MIDI numbering matches the note catalog by construction.
    pub pitch: u8,
}

impl NoteEvent {
    pub fn on(pitch: u8) -> Self {
        Self {
            kind: NoteKind::On,
            pitch,
        }
    }

    pub fn off(pitch: u8) -> Self {
        Self {
            kind: NoteKind::Off,
            pitch,
        }
    }
}

/// Decode a channel message from its status and first data byte.
///
/// The high nibble of `status` selects the kind: 0x90 = note on, 0x80 = note
/// off, anything else is ignored. The channel nibble and the velocity byte
/// are not inspected.
pub fn decode_message(status: u8, data1: u8) -> Option<NoteEvent> {
    match status & 0xF0 {
        0x90 => Some(NoteEvent::on(data1)),
        0x80 => Some(NoteEvent::off(data1)),
        _ => None,
    }
}

/// Decode a raw 2–3 byte message as delivered by the device backend.
pub fn decode_raw(msg: &[u8]) -> Option<NoteEvent> {
    if msg.len() < 2 {
        return None;
    }
    decode_message(msg[0], msg[1])
}
