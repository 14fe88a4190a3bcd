//! Static-noise suppression against a field-captured reference clip.
//!
//! Deployments share one stationary interference pattern (a mechanical hum
//! from nearby pumping equipment) that would otherwise dominate the
//! anthropogenic band of every recording. A single reference clip of that
//! hum, captured once on site, drives two suppression stages run in order:
//!
//! 1. **Power-matched subtraction.** The reference is truncated or
//!    wrap-tiled to the recording's length, scaled so its power sits
//!    `snr_db` below the recording's, and subtracted sample-by-sample.
//! 2. **Spectral gating.** The subtracted signal is transformed (window
//!    2048, hop 512); any time–frequency bin whose magnitude does not exceed
//!    the reference's mean per-bin magnitude × the gate factor is zeroed,
//!    and the signal is rebuilt from the gated magnitude with the original
//!    phase.
//!
//! The only defensive branch is a zero-power reference, which disables
//! denoising entirely and returns the input unchanged. Identical inputs
//! always produce bit-identical output.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::audio::{self, resample::resample_buffer};
use crate::config::PipelineConfig;
use crate::dsp::Stft;
use crate::error::{Result, SoundscapeError};

/// The shared reference noise clip, loaded once per batch.
///
/// Owned by the batch runner and handed to every worker as an
/// `Arc<NoiseProfile>`; it is never mutated after load, so no locking is
/// involved. Length adjustment happens locally inside each denoise call.
#[derive(Debug, Clone)]
pub struct NoiseProfile {
    samples: Vec<f32>,
}

impl NoiseProfile {
    /// Build a profile from an already-decoded buffer at the analysis rate.
    pub fn from_samples(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    /// Load the reference WAV and resample it to `target_rate`.
    ///
    /// # Errors
    /// Any failure here is fatal for the batch — without the reference no
    /// row can be produced — and is reported as
    /// [`SoundscapeError::NoiseProfile`].
    pub fn load(path: &Path, target_rate: u32) -> Result<Arc<Self>> {
        let decoded = audio::read_wav_mono(path).map_err(|e| SoundscapeError::NoiseProfile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let samples = resample_buffer(&decoded.samples, decoded.sample_rate, target_rate)
            .map_err(|e| SoundscapeError::NoiseProfile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        info!(
            path = %path.display(),
            native_rate = decoded.sample_rate,
            samples = samples.len(),
            "noise reference loaded"
        );
        Ok(Arc::new(Self { samples }))
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Two-stage denoiser. One per worker; holds the pre-planned STFT.
pub struct Denoiser {
    snr_db: f64,
    gate_factor: f32,
    stft: Stft,
}

impl Denoiser {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            snr_db: config.snr_db,
            gate_factor: config.gate_factor,
            stft: Stft::new(config.denoise_fft_size, config.denoise_hop),
        }
    }

    /// Suppress the reference pattern in `audio`.
    ///
    /// Returns a cleaned buffer of the same nominal length — spectral
    /// reconstruction may come up short by less than one hop, which callers
    /// tolerate. Never fails on well-formed input: a zero-power reference
    /// short-circuits to an unchanged copy.
    pub fn denoise(&self, audio: &[f32], noise: &NoiseProfile) -> Vec<f32> {
        if noise.is_empty() || audio.is_empty() {
            return audio.to_vec();
        }

        let fitted = fit_length(noise.samples(), audio.len());
        let noise_power = mean_square(&fitted);
        if noise_power == 0.0 {
            debug!("noise reference has zero power — denoising skipped");
            return audio.to_vec();
        }

        // Stage 1: subtract the reference, scaled so that after subtraction
        // the residual reference power sits snr_db below the signal power.
        let audio_power = mean_square(audio);
        let desired_noise_power = audio_power / 10f64.powf(self.snr_db / 10.0);
        let scale = (desired_noise_power / noise_power).sqrt() as f32;
        let subtracted: Vec<f32> = audio
            .iter()
            .zip(&fitted)
            .map(|(a, n)| a - n * scale)
            .collect();

        // Stage 2: gate bins below the reference's spectral footprint.
        let mut frames = self.stft.forward(&subtracted);
        if frames.num_frames() == 0 {
            // Shorter than one analysis window; subtraction is all we can do.
            return subtracted;
        }
        let noise_frames = self.stft.forward(&fitted);
        let threshold = mean_bin_magnitude(&noise_frames.magnitude, self.gate_factor);

        for mag in &mut frames.magnitude {
            for (m, thr) in mag.iter_mut().zip(&threshold) {
                if *m <= *thr {
                    *m = 0.0;
                }
            }
        }

        self.stft.inverse(&frames)
    }
}

/// Truncate or wrap-tile `noise` to exactly `len` samples.
fn fit_length(noise: &[f32], len: usize) -> Vec<f32> {
    if noise.len() >= len {
        return noise[..len].to_vec();
    }
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        let take = (len - out.len()).min(noise.len());
        out.extend_from_slice(&noise[..take]);
    }
    out
}

fn mean_square(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| s as f64 * s as f64).sum();
    sum / samples.len() as f64
}

/// Per-bin mean magnitude across time, scaled by the gate factor.
fn mean_bin_magnitude(frames: &[Vec<f32>], gate_factor: f32) -> Vec<f32> {
    let Some(first) = frames.first() else {
        return Vec::new();
    };
    let mut mean = vec![0.0f64; first.len()];
    for frame in frames {
        for (acc, &m) in mean.iter_mut().zip(frame) {
            *acc += m as f64;
        }
    }
    let n = frames.len() as f64;
    mean.iter()
        .map(|&acc| (acc / n) as f32 * gate_factor)
        .collect()
}
