//! MIDI controller support — message decoding and external device input.

pub mod config;
pub mod decode;
pub mod input;
pub mod stream;

pub use config::MidiConfig;
pub use decode::{decode_message, decode_raw, NoteEvent, NoteKind};
pub use input::MidiInput;
pub use stream::{note_channel, NoteReceiver, NoteSender};
