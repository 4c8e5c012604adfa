//! Commands sent from the engine to the audio-thread mixer via ring buffer.

use super::voice::VoiceSource;

/// Voice control commands. Envelope windows travel with each command so the
/// mixer carries no configuration of its own.
#[derive(Debug)]
pub enum VoiceCommand {
    /// Start (or hard-retrigger) the voice for a pitch.
    Start {
        pitch: u8,
        source: VoiceSource,
        attack_secs: f32,
    },
    /// Begin the release tail for a pitch. No-op if the pitch is silent.
    Release { pitch: u8, release_secs: f32 },
    /// Discard the voice for a pitch outright, release tail included.
    /// Used by retriggers that cannot queue a replacement voice yet.
    Stop { pitch: u8 },
    /// Set master volume (clamped to 0.0..=1.0 on the audio thread).
    SetVolume(f32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::oscillator::Waveform;
    use ringbuf::{
        traits::{Consumer, Producer, Split},
        HeapRb,
    };

    #[test]
    fn commands_cross_the_ring_buffer_in_order() {
        let rb = HeapRb::<VoiceCommand>::new(16);
        let (mut prod, mut cons) = rb.split();

        prod.try_push(VoiceCommand::SetVolume(0.8)).unwrap();
        prod.try_push(VoiceCommand::Start {
            pitch: 60,
            source: VoiceSource::Osc {
                waveform: Waveform::Triangle,
                freq: 261.63,
            },
            attack_secs: 0.05,
        })
        .unwrap();
        prod.try_push(VoiceCommand::Release {
            pitch: 60,
            release_secs: 1.0,
        })
        .unwrap();
        prod.try_push(VoiceCommand::Stop { pitch: 60 }).unwrap();

        assert!(matches!(
            cons.try_pop().unwrap(),
            VoiceCommand::SetVolume(v) if (v - 0.8).abs() < f32::EPSILON
        ));
        assert!(matches!(
            cons.try_pop().unwrap(),
            VoiceCommand::Start { pitch: 60, .. }
        ));
        assert!(matches!(
            cons.try_pop().unwrap(),
            VoiceCommand::Release { pitch: 60, .. }
        ));
        assert!(matches!(
            cons.try_pop().unwrap(),
            VoiceCommand::Stop { pitch: 60 }
        ));
        assert!(cons.try_pop().is_none());
    }
}
