//! Pitch math — absolute pitch number to fundamental frequency.

/// Concert pitch reference: A4.
pub const A4_PITCH: u8 = 69;
/// Concert pitch reference frequency in Hz.
pub const A4_HZ: f64 = 440.0;

/// Convert an absolute pitch number to its fundamental frequency in Hz.
///
/// Equal temperament anchored at A4 (pitch 69) = 440 Hz.
pub fn pitch_to_frequency(pitch: u8) -> f64 {
    A4_HZ * 2.0f64.powf((pitch as f64 - A4_PITCH as f64) / 12.0)
}
