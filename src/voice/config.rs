//! Engine configuration — envelope windows, volume, and fallback timbre.
//!
//! Envelope durations are tunables, not contracts: load overrides from
//! ~/.klavier/engine.yaml or pass a custom config to the engine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::oscillator::Waveform;

/// Tunable parameters for the voice engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Gain ramp 0 → 1 on note-on, in seconds. Avoids the start click.
    #[serde(default = "EngineConfig::default_attack")]
    pub attack_secs: f32,
    /// Release tail on note-off, in seconds.
    #[serde(default = "EngineConfig::default_release")]
    pub release_secs: f32,
    /// Master volume, 0.0..=1.0.
    #[serde(default = "EngineConfig::default_volume")]
    pub volume: f32,
    /// Timbre for synthesized voices when no sample is available.
    #[serde(default = "EngineConfig::default_waveform")]
    pub waveform: Waveform,
    /// Hard ceiling on the shared output bus, 0.0..=1.0.
    #[serde(default = "EngineConfig::default_limiter_ceiling")]
    pub limiter_ceiling: f32,
}

impl EngineConfig {
    fn default_attack() -> f32 {
        0.05
    }

    fn default_release() -> f32 {
        1.0
    }

    fn default_volume() -> f32 {
        1.0
    }

    fn default_waveform() -> Waveform {
        Waveform::Triangle
    }

    fn default_limiter_ceiling() -> f32 {
        0.95
    }

    /// Load config from the standard path (~/.klavier/engine.yaml).
    /// Returns None if the file doesn't exist (graceful fallback).
    pub fn load() -> Option<Self> {
        let home = dirs::home_dir()?;
        let path = home.join(".klavier").join("engine.yaml");
        Self::read_yaml(&path).ok()
    }

    /// Load config from an explicit file path, as given on the command line.
    /// Unlike [`load`], a missing or malformed file is worth telling the user
    /// about before falling back.
    ///
    /// [`load`]: EngineConfig::load
    pub fn load_path(path: &Path) -> Option<Self> {
        match Self::read_yaml(path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("ignoring config {}: {e}", path.display());
                None
            }
        }
    }

    fn read_yaml(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            attack_secs: Self::default_attack(),
            release_secs: Self::default_release(),
            volume: Self::default_volume(),
            waveform: Self::default_waveform(),
            limiter_ceiling: Self::default_limiter_ceiling(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert!((config.attack_secs - 0.05).abs() < f32::EPSILON);
        assert!((config.release_secs - 1.0).abs() < f32::EPSILON);
        assert!((config.volume - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.waveform, Waveform::Triangle);
        assert!((config.limiter_ceiling - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: EngineConfig = serde_yaml::from_str("release_secs: 0.5").unwrap();
        assert!((config.release_secs - 0.5).abs() < f32::EPSILON);
        assert!((config.attack_secs - 0.05).abs() < f32::EPSILON);
        assert_eq!(config.waveform, Waveform::Triangle);
        assert!((config.limiter_ceiling - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn full_yaml_round_trip() {
        let config = EngineConfig {
            attack_secs: 0.01,
            release_secs: 1.2,
            volume: 0.8,
            waveform: Waveform::Sine,
            limiter_ceiling: 0.9,
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: EngineConfig = serde_yaml::from_str(&yaml).unwrap();
        assert!((parsed.release_secs - 1.2).abs() < f32::EPSILON);
        assert_eq!(parsed.waveform, Waveform::Sine);
        assert!((parsed.limiter_ceiling - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn load_path_reads_the_given_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.yaml");
        std::fs::write(&path, "release_secs: 0.25\nvolume: 0.6\n").unwrap();

        let config = EngineConfig::load_path(&path).unwrap();
        assert!((config.release_secs - 0.25).abs() < f32::EPSILON);
        assert!((config.volume - 0.6).abs() < f32::EPSILON);
        // Unset fields keep their defaults.
        assert!((config.attack_secs - 0.05).abs() < f32::EPSILON);
    }

    #[test]
    fn load_path_missing_file_is_none() {
        assert!(EngineConfig::load_path(Path::new("/nonexistent/engine.yaml")).is_none());
    }

    #[test]
    fn load_path_malformed_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.yaml");
        std::fs::write(&path, "release_secs: [not, a, number]\n").unwrap();
        assert!(EngineConfig::load_path(&path).is_none());
    }
}
