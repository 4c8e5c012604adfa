//! A single sounding voice — one per active pitch on the mixer.
//!
//! Lifecycle: Attack → Sustain → Releasing → removed. Gain ramps are linear
//! and always start from the current level, so an early release or retrigger
//! never jumps the gain (no clicks).

use std::sync::Arc;

use super::oscillator::{oscillator, Waveform};
use crate::sample::SampleData;

/// What a voice plays: a recorded buffer at a playback rate, or a synthesized
/// waveform at a fixed frequency. Built by the engine, consumed by the mixer.
#[derive(Debug, Clone)]
pub enum VoiceSource {
    Osc { waveform: Waveform, freq: f64 },
    Sample { data: Arc<SampleData>, rate: f64 },
}

/// Runtime playback state for a source.
#[derive(Debug)]
enum SourceState {
    Osc {
        waveform: Waveform,
        phase: f64,
        step: f64,
    },
    Sample {
        data: Arc<SampleData>,
        pos: f64,
        step: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Attack,
    Sustain,
    Releasing,
}

/// One independently controllable sounding instance of a single pitch.
#[derive(Debug)]
pub struct Voice {
    source: SourceState,
    stage: Stage,
    level: f32,
    attack_step: f32,
    release_step: f32,
    finished: bool,
}

impl Voice {
    /// Start a voice. The attack ramps gain 0 → 1 over `attack_secs`.
    ///
    /// For sample sources the per-frame step combines the pitch-fold playback
    /// rate with the recording/output rate ratio.
    pub fn start(source: VoiceSource, attack_secs: f32, out_rate: u32) -> Self {
        let source = match source {
            VoiceSource::Osc { waveform, freq } => SourceState::Osc {
                waveform,
                phase: 0.0,
                step: freq / out_rate as f64,
            },
            VoiceSource::Sample { data, rate } => {
                let step = rate * data.sample_rate() as f64 / out_rate as f64;
                SourceState::Sample {
                    data,
                    pos: 0.0,
                    step,
                }
            }
        };

        let attack_frames = attack_secs * out_rate as f32;
        let (stage, level, attack_step) = if attack_frames <= 1.0 {
            (Stage::Sustain, 1.0, 0.0)
        } else {
            (Stage::Attack, 0.0, 1.0 / attack_frames)
        };

        Self {
            source,
            stage,
            level,
            attack_step,
            release_step: 0.0,
            finished: false,
        }
    }

    /// Begin the release tail: ramp from the current level to silence over
    /// `release_secs`, after which the voice reports finished and the mixer
    /// tears it down.
    pub fn release(&mut self, release_secs: f32, out_rate: u32) {
        let release_frames = release_secs * out_rate as f32;
        if release_frames <= 1.0 {
            self.finished = true;
            return;
        }
        self.stage = Stage::Releasing;
        self.release_step = self.level / release_frames;
    }

    /// True once the release tail has completed or the sample ran out.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// True while the voice is in its release tail.
    pub fn is_releasing(&self) -> bool {
        self.stage == Stage::Releasing
    }

    /// Produce the next mono frame and advance the envelope.
    pub fn next_frame(&mut self) -> f32 {
        if self.finished {
            return 0.0;
        }

        let raw = match &mut self.source {
            SourceState::Osc {
                waveform,
                phase,
                step,
            } => {
                let v = oscillator(*waveform, *phase) as f32;
                *phase = (*phase + *step).fract();
                v
            }
            SourceState::Sample { data, pos, step } => {
                let frames = data.frames();
                let idx = *pos as usize;
                if idx >= frames.len() {
                    self.finished = true;
                    return 0.0;
                }
                let frac = (*pos - idx as f64) as f32;
                let a = frames[idx];
                let b = if idx + 1 < frames.len() {
                    frames[idx + 1]
                } else {
                    0.0
                };
                *pos += *step;
                a * (1.0 - frac) + b * frac
            }
        };

        let out = raw * self.level;

        match self.stage {
            Stage::Attack => {
                self.level += self.attack_step;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = Stage::Sustain;
                }
            }
            Stage::Sustain => {}
            Stage::Releasing => {
                self.level -= self.release_step;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.finished = true;
                }
            }
        }

        out
    }
}
