//! Note event channel — mpsc bridge between input transports and the engine.
//!
//! MIDI callbacks run on a backend thread; the engine runs on the host's
//! event loop. The channel decouples the two: transports clone the sender,
//! the loop drains the receiver each tick.

use std::sync::mpsc;

use super::decode::NoteEvent;

/// Sender half — clone one per input transport.
pub type NoteSender = mpsc::Sender<NoteEvent>;

/// Receiver half — held by the host event loop.
pub struct NoteReceiver {
    rx: mpsc::Receiver<NoteEvent>,
}

impl NoteReceiver {
    /// Non-blocking poll for the next note event.
    pub fn poll(&self) -> Option<NoteEvent> {
        self.rx.try_recv().ok()
    }

    /// Drain all pending events, preserving submission order.
    pub fn drain(&self) -> Vec<NoteEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Create a new note channel pair.
pub fn note_channel() -> (NoteSender, NoteReceiver) {
    let (tx, rx) = mpsc::channel();
    (tx, NoteReceiver { rx })
}
