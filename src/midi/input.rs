//! MIDI input — connects to an external controller and feeds the note channel.

use std::io;

use midir::{MidiInput as MidirInput, MidiInputConnection};

use super::config::MidiConfig;
use super::decode::decode_raw;
use super::stream::NoteSender;

/// Active MIDI input connection. Dropping it closes the port.
pub struct MidiInput {
    _connection: MidiInputConnection<()>,
    port_name: String,
}

impl MidiInput {
    /// Attach to a MIDI port matching the config's `device_name` (or the
    /// first available port) and forward decoded note events to `sender`.
    pub fn attach(config: &MidiConfig, sender: NoteSender) -> io::Result<Self> {
        let midi_in = MidirInput::new("klavier")
            .map_err(|e| io::Error::other(format!("MIDI init: {e}")))?;

        let ports = midi_in.ports();
        if ports.is_empty() {
            return Err(io::Error::other("no MIDI input ports available"));
        }

        let (port, port_name) = if let Some(ref name_filter) = config.device_name {
            ports
                .iter()
                .find_map(|p| {
                    let name = midi_in.port_name(p).unwrap_or_default();
                    if name.contains(name_filter.as_str()) {
                        Some((p.clone(), name))
                    } else {
                        None
                    }
                })
                .ok_or_else(|| {
                    io::Error::other(format!("MIDI device matching '{name_filter}' not found"))
                })?
        } else {
            let p = ports[0].clone();
            let name = midi_in
                .port_name(&p)
                .unwrap_or_else(|_| "unknown".to_string());
            (p, name)
        };

        let connection = midi_in
            .connect(
                &port,
                "klavier-input",
                move |_timestamp, msg, _| {
                    if let Some(event) = decode_raw(msg) {
                        // Receiver gone means the host is shutting down.
                        let _ = sender.send(event);
                    }
                },
                (),
            )
            .map_err(|e| io::Error::other(format!("MIDI connect: {e}")))?;

        log::info!("attached MIDI controller '{port_name}'");

        Ok(Self {
            _connection: connection,
            port_name,
        })
    }

    /// The connected port name.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// List available MIDI input device names. Empty when the backend is
    /// unavailable or no controller is connected — never an error; keyboard
    /// and pointer input remain fully functional.
    pub fn list_devices() -> Vec<String> {
        let Ok(midi_in) = MidirInput::new("klavier-list") else {
            return Vec::new();
        };
        midi_in
            .ports()
            .iter()
            .filter_map(|p| midi_in.port_name(p).ok())
            .collect()
    }
}
