//! Voice engine — turns the note-on/note-off stream into sound.
//!
//! The engine runs on the host's event loop and owns the decision layer:
//! which pitches are held, sample vs. synthesis per note, and the pending
//! intents for samples still loading. Actual rendering happens on the audio
//! thread in [`VoiceMixer`]; the two communicate over a lock-free ring
//! buffer. Sample loading resolves through [`SampleCache`]'s completion
//! channel, drained by [`VoiceEngine::pump`].

pub mod command;
pub mod config;
pub mod limiter;
pub mod mixer;
pub mod oscillator;
pub mod output;
#[allow(clippy::module_inception)]
pub mod voice;

pub use command::VoiceCommand;
pub use config::EngineConfig;
pub use limiter::Limiter;
pub use mixer::VoiceMixer;
pub use output::{AudioError, AudioOutput};
pub use voice::{Voice, VoiceSource};

use std::collections::{HashMap, HashSet};
use std::sync::mpsc;
use std::sync::Arc;

use ringbuf::{
    traits::{Producer, Split},
    HeapCons, HeapProd, HeapRb,
};

use crate::note::{pitch_to_frequency, NoteCatalog};
use crate::sample::{fold, Folding, SampleCache, SampleFetched};

/// Command queue capacity for a detached bus.
const DETACHED_QUEUE_CAPACITY: usize = 1024;

/// Where voice commands go: a device-backed stream, or a host-owned mixer.
enum Bus {
    Device(AudioOutput),
    Detached {
        producer: HeapProd<VoiceCommand>,
        sample_rate: u32,
    },
}

impl Bus {
    fn producer(&mut self) -> &mut HeapProd<VoiceCommand> {
        match self {
            Bus::Device(output) => &mut output.producer,
            Bus::Detached { producer, .. } => producer,
        }
    }

    fn sample_rate(&self) -> u32 {
        match self {
            Bus::Device(output) => output.sample_rate(),
            Bus::Detached { sample_rate, .. } => *sample_rate,
        }
    }
}

/// Polyphonic voice engine: one voice per sounding pitch, sample playback
/// with pitch-shifted reuse, synthesis fallback, and click-free envelopes.
pub struct VoiceEngine {
    catalog: Arc<NoteCatalog>,
    cache: SampleCache,
    completions: mpsc::Receiver<SampleFetched>,
    config: EngineConfig,
    bus: Option<Bus>,
    held: HashSet<u8>,
    pending: HashMap<u8, Folding>,
}

impl VoiceEngine {
    /// Create an engine that opens the default audio device lazily on the
    /// first `note_on` (platform autoplay/permission rules forbid earlier).
    pub fn new(
        catalog: Arc<NoteCatalog>,
        cache: SampleCache,
        completions: mpsc::Receiver<SampleFetched>,
        config: EngineConfig,
    ) -> Self {
        Self {
            catalog,
            cache,
            completions,
            config,
            bus: None,
            held: HashSet::new(),
            pending: HashMap::new(),
        }
    }

    /// Create an engine without a device: commands land on the returned
    /// consumer, which the host feeds to its own [`VoiceMixer`]. Used for
    /// embedding with a host-driven output callback, and by tests.
    pub fn detached(
        catalog: Arc<NoteCatalog>,
        cache: SampleCache,
        completions: mpsc::Receiver<SampleFetched>,
        config: EngineConfig,
        sample_rate: u32,
    ) -> (Self, HeapCons<VoiceCommand>) {
        let rb = HeapRb::<VoiceCommand>::new(DETACHED_QUEUE_CAPACITY);
        let (producer, consumer) = rb.split();
        let mut engine = Self::new(catalog, cache, completions, config);
        engine.bus = Some(Bus::Detached {
            producer,
            sample_rate: sample_rate.max(1),
        });
        engine.push(VoiceCommand::SetVolume(engine.config.volume));
        (engine, consumer)
    }

    /// Start (or hard-retrigger) the voice for `pitch`.
    ///
    /// If the folded sample is cached the voice starts immediately at the
    /// folded playback rate. Otherwise a fetch is requested and the intent
    /// parked until [`pump`] sees the completion; a fetch that fails falls
    /// back to a synthesized tone. Pitches outside the 88-key range are
    /// ignored.
    ///
    /// [`pump`]: VoiceEngine::pump
    pub fn note_on(&mut self, pitch: u8) {
        if !self.catalog.contains(pitch) {
            return;
        }
        self.ensure_bus();
        self.held.insert(pitch);

        let folding = fold(pitch);
        if let Some(data) = self.cache.lookup(folding.key) {
            self.pending.remove(&pitch);
            self.start_voice(
                pitch,
                VoiceSource::Sample {
                    data,
                    rate: folding.rate,
                },
            );
        } else {
            // A retrigger must cut whatever is still sounding for the pitch
            // right now, not when the fetch resolves.
            self.push(VoiceCommand::Stop { pitch });
            self.pending.insert(pitch, folding);
            self.cache.request(folding.key);
        }
    }

    /// Release the voice for `pitch`: the gain ramps to silence over the
    /// configured release window, then the mixer tears the voice down.
    /// No-op when nothing is sounding for the pitch. A release that beats a
    /// still-loading sample suppresses the playback (the fetch completes and
    /// is cached for reuse).
    pub fn note_off(&mut self, pitch: u8) {
        self.held.remove(&pitch);
        self.pending.remove(&pitch);
        self.push(VoiceCommand::Release {
            pitch,
            release_secs: self.config.release_secs,
        });
    }

    /// Drain sample-load completions and start the voices still wanted.
    /// The host loop calls this regularly; it never blocks.
    pub fn pump(&mut self) {
        while let Ok(fetched) = self.completions.try_recv() {
            let waiting: Vec<u8> = self
                .pending
                .iter()
                .filter(|(_, f)| f.key == fetched.key)
                .map(|(&pitch, _)| pitch)
                .collect();

            for pitch in waiting {
                let Some(folding) = self.pending.remove(&pitch) else {
                    continue;
                };
                if !self.held.contains(&pitch) {
                    // Released while loading: cache keeps the buffer, but
                    // nothing may sound.
                    log::debug!("pitch {pitch} released before its sample arrived");
                    continue;
                }
                match fetched.data {
                    Some(ref data) => self.start_voice(
                        pitch,
                        VoiceSource::Sample {
                            data: Arc::clone(data),
                            rate: folding.rate,
                        },
                    ),
                    None => {
                        // Failures are not memoized, so this completion may
                        // be stale: the key can have been re-requested or
                        // even resolved by a later fetch in the meantime.
                        if let Some(data) = self.cache.lookup(folding.key) {
                            self.start_voice(
                                pitch,
                                VoiceSource::Sample {
                                    data,
                                    rate: folding.rate,
                                },
                            );
                        } else if self.cache.is_in_flight(folding.key) {
                            self.pending.insert(pitch, folding);
                        } else {
                            log::debug!("no sample for pitch {pitch}, synthesizing");
                            self.start_voice(
                                pitch,
                                VoiceSource::Osc {
                                    waveform: self.config.waveform,
                                    freq: pitch_to_frequency(pitch),
                                },
                            );
                        }
                    }
                }
            }
        }
    }

    /// Set master volume on the shared bus.
    pub fn set_volume(&mut self, volume: f32) {
        self.push(VoiceCommand::SetVolume(volume));
    }

    /// Whether a note-on for `pitch` is outstanding (sounding or loading).
    pub fn is_held(&self, pitch: u8) -> bool {
        self.held.contains(&pitch)
    }

    /// Number of held pitches.
    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Output sample rate once the bus exists.
    pub fn sample_rate(&self) -> Option<u32> {
        self.bus.as_ref().map(|b| b.sample_rate())
    }

    fn ensure_bus(&mut self) {
        if self.bus.is_some() {
            return;
        }
        match AudioOutput::open(self.config.limiter_ceiling) {
            Ok(output) => {
                log::info!(
                    "audio output opened: {} Hz, {} channels",
                    output.sample_rate(),
                    output.channels()
                );
                self.bus = Some(Bus::Device(output));
                self.push(VoiceCommand::SetVolume(self.config.volume));
            }
            // Not fatal: retried on the next note_on.
            Err(e) => log::warn!("audio output unavailable: {e}"),
        }
    }

    fn start_voice(&mut self, pitch: u8, source: VoiceSource) {
        self.push(VoiceCommand::Start {
            pitch,
            source,
            attack_secs: self.config.attack_secs,
        });
    }

    fn push(&mut self, cmd: VoiceCommand) {
        let Some(bus) = self.bus.as_mut() else {
            return;
        };
        if bus.producer().try_push(cmd).is_err() {
            log::warn!("voice command queue full, dropping command");
        }
    }
}
