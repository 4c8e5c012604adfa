//! MIDI configuration — device selection loaded from ~/.klavier/midi.yaml.

use serde::{Deserialize, Serialize};

/// MIDI input configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MidiConfig {
    /// Preferred device name (substring match). None = first available.
    #[serde(default)]
    pub device_name: Option<String>,
}

impl MidiConfig {
    /// Load config from the standard path (~/.klavier/midi.yaml).
    /// Returns None if the file doesn't exist (graceful fallback).
    pub fn load() -> Option<Self> {
        let home = dirs::home_dir()?;
        let path = home.join(".klavier").join("midi.yaml");
        let content = std::fs::read_to_string(path).ok()?;
        serde_yaml::from_str(&content).ok()
    }
}
