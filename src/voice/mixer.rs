//! Voice mixer — runs on the cpal audio thread.
//!
//! Drains voice commands from the ring buffer, renders the active voices
//! additively into the output, applies master volume and the limiter.
//! One voice per pitch: starting a pitch that is already sounding (or still
//! releasing) replaces it outright, cancelling any pending teardown.

use std::collections::HashMap;

use ringbuf::traits::Consumer;
use ringbuf::HeapCons;

use super::command::VoiceCommand;
use super::limiter::Limiter;
use super::voice::Voice;

/// State that lives on the audio thread. Accessed only from the callback.
pub struct VoiceMixer {
    consumer: HeapCons<VoiceCommand>,
    active: HashMap<u8, Voice>,
    volume: f32,
    limiter: Limiter,
    channels: u16,
    sample_rate: u32,
}

impl VoiceMixer {
    pub fn new(
        consumer: HeapCons<VoiceCommand>,
        channels: u16,
        sample_rate: u32,
        limiter_ceiling: f32,
    ) -> Self {
        Self {
            consumer,
            active: HashMap::new(),
            volume: 1.0,
            limiter: Limiter::new(limiter_ceiling),
            channels,
            sample_rate,
        }
    }

    /// Called for each audio block. Fills `output` with interleaved frames.
    pub fn process(&mut self, output: &mut [f32]) {
        // 1. Drain pending commands.
        while let Some(cmd) = self.consumer.try_pop() {
            match cmd {
                VoiceCommand::Start {
                    pitch,
                    source,
                    attack_secs,
                } => {
                    // Hard retrigger: the previous voice for this pitch is
                    // dropped on the spot, release tail and all.
                    self.active
                        .insert(pitch, Voice::start(source, attack_secs, self.sample_rate));
                }
                VoiceCommand::Release {
                    pitch,
                    release_secs,
                } => {
                    if let Some(voice) = self.active.get_mut(&pitch) {
                        voice.release(release_secs, self.sample_rate);
                    }
                }
                VoiceCommand::Stop { pitch } => {
                    self.active.remove(&pitch);
                }
                VoiceCommand::SetVolume(v) => {
                    self.volume = v.clamp(0.0, 1.0);
                }
            }
        }

        // 2. Render voices additively, mono fanned out to every channel.
        let channels = self.channels as usize;
        for frame in output.chunks_mut(channels) {
            let mut mix = 0.0f32;
            for voice in self.active.values_mut() {
                mix += voice.next_frame();
            }
            let sample = mix * self.volume;
            for out in frame.iter_mut() {
                *out = sample;
            }
        }

        // 3. Tear down voices whose release tail (or buffer) completed.
        self.active.retain(|_, voice| !voice.is_finished());

        // 4. Master limiter on the shared bus.
        self.limiter.apply(output);
    }

    /// Number of currently active voices (sounding or releasing).
    pub fn active_voices(&self) -> usize {
        self.active.len()
    }

    /// Whether a voice exists for `pitch`.
    pub fn is_active(&self, pitch: u8) -> bool {
        self.active.contains_key(&pitch)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SampleData;
    use crate::voice::oscillator::Waveform;
    use crate::voice::voice::VoiceSource;
    use ringbuf::{
        traits::{Producer, Split},
        HeapRb,
    };
    use std::sync::Arc;

    const RATE: u32 = 1000;

    fn setup() -> (ringbuf::HeapProd<VoiceCommand>, VoiceMixer) {
        setup_with_ceiling(0.95)
    }

    fn setup_with_ceiling(ceiling: f32) -> (ringbuf::HeapProd<VoiceCommand>, VoiceMixer) {
        let rb = HeapRb::<VoiceCommand>::new(64);
        let (prod, cons) = rb.split();
        let mixer = VoiceMixer::new(cons, 2, RATE, ceiling);
        (prod, mixer)
    }

    fn start_cmd(pitch: u8, attack_secs: f32) -> VoiceCommand {
        VoiceCommand::Start {
            pitch,
            source: VoiceSource::Osc {
                waveform: Waveform::Square,
                freq: 100.0,
            },
            attack_secs,
        }
    }

    #[test]
    fn silence_when_no_voices() {
        let (_prod, mut mixer) = setup();
        let mut output = vec![999.0f32; 64];
        mixer.process(&mut output);
        assert!(output.iter().all(|&s| s == 0.0));
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn start_produces_sound() {
        let (mut prod, mut mixer) = setup();
        prod.try_push(start_cmd(60, 0.0)).unwrap();

        let mut output = vec![0.0f32; 64];
        mixer.process(&mut output);
        assert!(output.iter().any(|&s| s.abs() > 0.1));
        assert!(mixer.is_active(60));
    }

    #[test]
    fn double_start_keeps_one_voice() {
        let (mut prod, mut mixer) = setup();
        prod.try_push(start_cmd(60, 0.0)).unwrap();
        prod.try_push(start_cmd(60, 0.0)).unwrap();

        let mut output = vec![0.0f32; 64];
        mixer.process(&mut output);
        assert_eq!(mixer.active_voices(), 1);
        // A single full-level square voice never exceeds 1.0, so a doubled
        // voice would have been caught by the limiter check below.
        assert!(output.iter().all(|&s| s.abs() <= 1.0));
    }

    #[test]
    fn release_then_removal() {
        let (mut prod, mut mixer) = setup();
        prod.try_push(start_cmd(60, 0.0)).unwrap();
        let mut output = vec![0.0f32; 64];
        mixer.process(&mut output);
        assert_eq!(mixer.active_voices(), 1);

        prod.try_push(VoiceCommand::Release {
            pitch: 60,
            release_secs: 0.02, // 20 frames at RATE
        })
        .unwrap();
        // One block covers the whole tail (64 stereo samples = 32 frames).
        mixer.process(&mut output);
        assert_eq!(mixer.active_voices(), 0, "released voice not torn down");
    }

    #[test]
    fn release_of_silent_pitch_is_noop() {
        let (mut prod, mut mixer) = setup();
        prod.try_push(VoiceCommand::Release {
            pitch: 60,
            release_secs: 1.0,
        })
        .unwrap();
        let mut output = vec![0.0f32; 16];
        mixer.process(&mut output);
        assert_eq!(mixer.active_voices(), 0);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn retrigger_during_release_cancels_teardown() {
        let (mut prod, mut mixer) = setup();
        prod.try_push(start_cmd(60, 0.0)).unwrap();
        let mut output = vec![0.0f32; 8];
        mixer.process(&mut output);

        prod.try_push(VoiceCommand::Release {
            pitch: 60,
            release_secs: 1.0,
        })
        .unwrap();
        prod.try_push(start_cmd(60, 0.0)).unwrap();

        // Render well past where the release would have finished.
        for _ in 0..40 {
            mixer.process(&mut output);
        }
        assert_eq!(mixer.active_voices(), 1, "retriggered voice was torn down");
        mixer.process(&mut output);
        assert!(output.iter().any(|&s| s.abs() > 0.1));
    }

    #[test]
    fn independent_pitches_mix() {
        let (mut prod, mut mixer) = setup();
        prod.try_push(start_cmd(60, 0.0)).unwrap();
        prod.try_push(start_cmd(64, 0.0)).unwrap();
        prod.try_push(start_cmd(67, 0.0)).unwrap();

        let mut output = vec![0.0f32; 32];
        mixer.process(&mut output);
        assert_eq!(mixer.active_voices(), 3);

        prod.try_push(VoiceCommand::Release {
            pitch: 64,
            release_secs: 0.0,
        })
        .unwrap();
        mixer.process(&mut output);
        assert_eq!(mixer.active_voices(), 2);
        assert!(mixer.is_active(60));
        assert!(!mixer.is_active(64));
        assert!(mixer.is_active(67));
    }

    #[test]
    fn stop_discards_the_voice_at_once() {
        let (mut prod, mut mixer) = setup();
        prod.try_push(start_cmd(60, 0.0)).unwrap();
        let mut output = vec![0.0f32; 16];
        mixer.process(&mut output);
        assert!(mixer.is_active(60));

        // Even a releasing voice goes away immediately, tail and all.
        prod.try_push(VoiceCommand::Release {
            pitch: 60,
            release_secs: 1.0,
        })
        .unwrap();
        prod.try_push(VoiceCommand::Stop { pitch: 60 }).unwrap();
        mixer.process(&mut output);
        assert_eq!(mixer.active_voices(), 0);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn stop_of_silent_pitch_is_noop() {
        let (mut prod, mut mixer) = setup();
        prod.try_push(VoiceCommand::Stop { pitch: 60 }).unwrap();
        let mut output = vec![0.0f32; 16];
        mixer.process(&mut output);
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn limiter_caps_stacked_voices() {
        let (mut prod, mut mixer) = setup();
        // Square waves at full level sum well past 1.0.
        for pitch in [60, 64, 67, 72] {
            prod.try_push(start_cmd(pitch, 0.0)).unwrap();
        }
        let mut output = vec![0.0f32; 64];
        mixer.process(&mut output);
        assert!(output.iter().all(|&s| s.abs() <= 0.95 + 1e-6));
        assert!(output.iter().any(|&s| s.abs() > 0.9), "limiter should engage");
    }

    #[test]
    fn configured_ceiling_caps_the_bus() {
        let (mut prod, mut mixer) = setup_with_ceiling(0.5);
        for pitch in [60, 64, 67] {
            prod.try_push(start_cmd(pitch, 0.0)).unwrap();
        }
        let mut output = vec![0.0f32; 64];
        mixer.process(&mut output);
        assert!(output.iter().all(|&s| s.abs() <= 0.5 + 1e-6));
        assert!(output.iter().any(|&s| s.abs() > 0.45));
    }

    #[test]
    fn volume_scales_output() {
        let (mut prod, mut mixer) = setup();
        prod.try_push(VoiceCommand::SetVolume(0.25)).unwrap();
        prod.try_push(start_cmd(60, 0.0)).unwrap();

        let mut output = vec![0.0f32; 16];
        mixer.process(&mut output);
        assert!(output.iter().all(|&s| s.abs() <= 0.25 + 1e-6));
        assert!(output.iter().any(|&s| s.abs() > 0.2));
    }

    #[test]
    fn sample_voice_finishes_and_is_removed() {
        let (mut prod, mut mixer) = setup();
        let data = Arc::new(SampleData::from_mono(vec![0.5; 10], RATE));
        prod.try_push(VoiceCommand::Start {
            pitch: 60,
            source: VoiceSource::Sample { data, rate: 1.0 },
            attack_secs: 0.0,
        })
        .unwrap();

        let mut output = vec![0.0f32; 64]; // 32 frames > 10-frame sample
        mixer.process(&mut output);
        assert_eq!(mixer.active_voices(), 0, "spent sample voice not removed");
    }

    #[test]
    fn both_channels_carry_the_mono_mix() {
        let (mut prod, mut mixer) = setup();
        prod.try_push(start_cmd(60, 0.0)).unwrap();
        let mut output = vec![0.0f32; 32];
        mixer.process(&mut output);
        for frame in output.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
    }
}
