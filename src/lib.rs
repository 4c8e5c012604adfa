//! Klavier — a playable piano engine.
//!
//! The two halves of an on-screen musical keyboard that are not UI: the
//! input-to-note mapping layer (physical keyboard rows, MIDI controllers)
//! and the polyphonic voice engine (sample playback with pitch-shifted
//! reuse, synthesis fallback, click-free envelopes, shared limited bus).
//!
//! A host UI resolves its input through [`keymap::KeyMap`] and
//! [`midi::decode_message`], drives [`voice::VoiceEngine::note_on`] /
//! [`voice::VoiceEngine::note_off`], and reads [`note::NoteCatalog`] to
//! render key caps.

pub mod keymap;
pub mod midi;
pub mod note;
pub mod sample;
pub mod voice;
