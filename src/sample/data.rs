//! Decoded sample buffers — WAV loading with mono mixdown and resampling.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Errors from loading or converting a sample.
#[derive(Debug)]
pub enum SampleError {
    /// WAV decoding or I/O error.
    Wav(hound::Error),
    /// The file decoded to zero samples.
    Empty,
    /// No recording exists for this key.
    Unavailable(u8),
}

impl std::fmt::Display for SampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleError::Wav(e) => write!(f, "WAV error: {e}"),
            SampleError::Empty => write!(f, "WAV file contains no samples"),
            SampleError::Unavailable(key) => write!(f, "no recording for pitch {key}"),
        }
    }
}

impl std::error::Error for SampleError {}

impl From<hound::Error> for SampleError {
    fn from(e: hound::Error) -> Self {
        SampleError::Wav(e)
    }
}

/// A decoded mono audio buffer at a known sample rate.
///
/// Entries live for the process lifetime once cached, so the buffer is shared
/// behind an `Arc` by everyone who plays it.
#[derive(Debug, Clone)]
pub struct SampleData {
    frames: Vec<f32>,
    sample_rate: u32,
}

impl SampleData {
    /// Wrap raw mono f32 frames.
    pub fn from_mono(frames: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            frames,
            sample_rate,
        }
    }

    /// Decode a WAV stream into a mono buffer.
    ///
    /// 16-bit (and other integer widths) and 32-bit float formats are
    /// supported; multi-channel files are averaged down to mono. The source
    /// sample rate is kept — playback-rate conversion happens per voice.
    pub fn from_wav<R: Read + Seek>(reader: R) -> Result<Self, SampleError> {
        let wav = hound::WavReader::new(reader)?;
        let spec = wav.spec();
        let channels = spec.channels as usize;
        let sample_rate = spec.sample_rate;

        let raw: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Int => {
                let scale = (1u32 << (spec.bits_per_sample - 1)) as f32;
                wav.into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<Vec<f32>, _>>()?
            }
            hound::SampleFormat::Float => {
                wav.into_samples::<f32>().collect::<Result<Vec<f32>, _>>()?
            }
        };

        if raw.is_empty() {
            return Err(SampleError::Empty);
        }

        let frames = if channels == 1 {
            raw
        } else {
            raw.chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        };

        Ok(Self {
            frames,
            sample_rate,
        })
    }

    /// Decode a WAV file from disk.
    pub fn from_wav_path(path: &Path) -> Result<Self, SampleError> {
        let file = File::open(path).map_err(|e| SampleError::Wav(hound::Error::IoError(e)))?;
        Self::from_wav(BufReader::new(file))
    }

    /// The mono frame buffer.
    pub fn frames(&self) -> &[f32] {
        &self.frames
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The native sample rate of the recording.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration of the recording in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames.len() as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn write_wav_16bit(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::new(&mut buf, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        buf.into_inner()
    }

    fn write_wav_f32(samples: &[f32], sample_rate: u32, channels: u16) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::new(&mut buf, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        buf.into_inner()
    }

    #[test]
    fn from_mono_stores_frames() {
        let sd = SampleData::from_mono(vec![0.1, 0.2, 0.3], 44100);
        assert_eq!(sd.frames(), &[0.1, 0.2, 0.3]);
        assert_eq!(sd.sample_rate(), 44100);
        assert_eq!(sd.len(), 3);
        assert!(!sd.is_empty());
    }

    #[test]
    fn wav_mono_16bit() {
        let bytes = write_wav_16bit(&[0, 16384, -16384], 44100, 1);
        let sd = SampleData::from_wav(Cursor::new(bytes)).unwrap();
        assert_eq!(sd.len(), 3);
        assert!(sd.frames()[0].abs() < 1e-6);
        assert!((sd.frames()[1] - 0.5).abs() < 1e-3);
        assert!((sd.frames()[2] + 0.5).abs() < 1e-3);
    }

    #[test]
    fn wav_mono_f32() {
        let bytes = write_wav_f32(&[0.0, 0.5, -0.5, 1.0], 48000, 1);
        let sd = SampleData::from_wav(Cursor::new(bytes)).unwrap();
        assert_eq!(sd.len(), 4);
        assert_eq!(sd.sample_rate(), 48000);
        assert!((sd.frames()[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn wav_stereo_mixdown() {
        // L=0.8, R=0.2 → 0.5; L=-0.4, R=-0.6 → -0.5
        let bytes = write_wav_f32(&[0.8, 0.2, -0.4, -0.6], 44100, 2);
        let sd = SampleData::from_wav(Cursor::new(bytes)).unwrap();
        assert_eq!(sd.len(), 2);
        assert!((sd.frames()[0] - 0.5).abs() < 1e-6);
        assert!((sd.frames()[1] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn empty_wav_is_error() {
        let bytes = write_wav_f32(&[], 44100, 1);
        match SampleData::from_wav(Cursor::new(bytes)) {
            Err(SampleError::Empty) => {}
            other => panic!("expected Empty, got {other:?}"),
        }
    }

    #[test]
    fn garbage_bytes_are_wav_error() {
        let garbage = vec![0u8; 32];
        assert!(matches!(
            SampleData::from_wav(Cursor::new(garbage)),
            Err(SampleError::Wav(_))
        ));
    }

    #[test]
    fn missing_file_is_error() {
        let err = SampleData::from_wav_path(Path::new("/nonexistent/60.wav")).unwrap_err();
        assert!(matches!(err, SampleError::Wav(_)));
    }

    #[test]
    fn duration() {
        let sd = SampleData::from_mono(vec![0.0; 44100], 44100);
        assert!((sd.duration_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn error_display() {
        assert_eq!(
            SampleError::Unavailable(60).to_string(),
            "no recording for pitch 60"
        );
        assert_eq!(
            SampleError::Empty.to_string(),
            "WAV file contains no samples"
        );
    }
}
