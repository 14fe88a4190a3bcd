//! WAV ingest.
//!
//! Recordings arrive as uncompressed PCM at whatever rate and channel count
//! the recorder shipped with. Everything is reduced to mono f32 here and
//! resampled to the configured analysis rate before any DSP sees it.

pub mod resample;

use std::path::Path;

use hound::SampleFormat;
use tracing::debug;

use crate::error::Result;

/// Mono f32 samples at their native rate, straight from the decoder.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Native sample rate reported by the WAV header (Hz).
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Duration of the decoded clip in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decode a WAV file to mono f32.
///
/// Multi-channel input is downmixed by averaging each frame. Integer PCM is
/// normalized by the format's full-scale value; float PCM passes through.
pub fn read_wav_mono(path: &Path) -> Result<DecodedAudio> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    debug!(
        path = %path.display(),
        rate = spec.sample_rate,
        channels,
        samples = samples.len(),
        "decoded wav"
    );

    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use hound::{WavSpec, WavWriter};

    fn write_wav(path: &Path, spec: WavSpec, frames: &[Vec<f32>]) {
        let mut writer = WavWriter::create(path, spec).expect("create wav");
        for frame in frames {
            for &s in frame {
                match spec.sample_format {
                    SampleFormat::Float => writer.write_sample(s).unwrap(),
                    SampleFormat::Int => {
                        let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                        writer.write_sample((s * full_scale) as i32).unwrap()
                    }
                }
            }
        }
        writer.finalize().expect("finalize wav");
    }

    #[test]
    fn stereo_is_downmixed_by_averaging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 48_000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        write_wav(&path, spec, &[vec![0.5, -0.5], vec![1.0, 0.0]]);

        let decoded = read_wav_mono(&path).expect("decode");
        assert_eq!(decoded.sample_rate, 48_000);
        assert_eq!(decoded.samples, vec![0.0, 0.5]);
    }

    #[test]
    fn int16_is_normalized_to_unit_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono16.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        write_wav(&path, spec, &[vec![0.5], vec![-0.25]]);

        let decoded = read_wav_mono(&path).expect("decode");
        assert!((decoded.samples[0] - 0.5).abs() < 1e-3);
        assert!((decoded.samples[1] + 0.25).abs() < 1e-3);
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        assert!(read_wav_mono(Path::new("/definitely/not/here.wav")).is_err());
    }
}
