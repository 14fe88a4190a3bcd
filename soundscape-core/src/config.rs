//! Pipeline tuning knobs.
//!
//! Every constant the analysis depends on lives here rather than being baked
//! into the DSP code: the segment sampling policy, the denoiser's SNR target
//! and gate factor, and both STFT geometries. Defaults reproduce the field
//! deployment configuration (120 s segments, 60 s gaps, two segments per
//! file — at most the first 300 s of each recording is analyzed; that is the
//! sampling policy, not a limitation).

use serde::{Deserialize, Serialize};

/// Configuration for the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct PipelineConfig {
    /// Analysis sample rate (Hz). Recordings and the noise reference are
    /// resampled to this before any DSP. Default: 48000.
    pub target_sample_rate: u32,
    /// Length of each analyzed segment in seconds. Default: 120.
    pub segment_secs: f64,
    /// Gap skipped between consecutive segments in seconds. Default: 60.
    pub skip_secs: f64,
    /// Maximum number of segments taken per recording. Default: 2.
    pub segments_per_file: usize,
    /// Target signal-to-noise ratio (dB) for the time-domain subtraction
    /// stage. Default: 18.
    pub snr_db: f64,
    /// Spectral-gate threshold multiplier applied to the reference clip's
    /// mean per-bin magnitude. Default: 1.2.
    pub gate_factor: f32,
    /// STFT window size for denoising. Default: 2048.
    pub denoise_fft_size: usize,
    /// STFT hop for denoising. Default: 512.
    pub denoise_hop: usize,
    /// Spectrogram window size for index computation. Default: 1024.
    pub index_fft_size: usize,
    /// Spectrogram overlap for index computation (hop = size − overlap).
    /// Default: 512.
    pub index_overlap: usize,
    /// Worker threads for the batch runner. 0 means one per available core.
    pub workers: usize,
    /// Wall-clock budget per recording in seconds; an over-budget file is
    /// recorded as failed, not retried. Default: 300.
    pub file_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 48_000,
            segment_secs: 120.0,
            skip_secs: 60.0,
            segments_per_file: 2,
            snr_db: 18.0,
            gate_factor: 1.2,
            denoise_fft_size: 2048,
            denoise_hop: 512,
            index_fft_size: 1024,
            index_overlap: 512,
            workers: 0,
            file_timeout_secs: 300,
        }
    }
}

impl PipelineConfig {
    /// Segment length in samples at the configured rate.
    pub fn segment_samples(&self) -> usize {
        (self.segment_secs * self.target_sample_rate as f64) as usize
    }

    /// Inter-segment gap in samples at the configured rate.
    pub fn skip_samples(&self) -> usize {
        (self.skip_secs * self.target_sample_rate as f64) as usize
    }

    /// Spectrogram hop for index computation.
    pub fn index_hop(&self) -> usize {
        self.index_fft_size.saturating_sub(self.index_overlap).max(1)
    }

    /// Effective worker count (resolves `workers == 0` to the core count).
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// Clamp out-of-range values to something the DSP can run with.
    ///
    /// Settings files are user-edited; a zero FFT size or negative duration
    /// must not reach the planner.
    pub fn normalize(&mut self) {
        self.target_sample_rate = self.target_sample_rate.clamp(8_000, 384_000);
        self.segment_secs = self.segment_secs.clamp(1.0, 3_600.0);
        self.skip_secs = self.skip_secs.clamp(0.0, 3_600.0);
        self.segments_per_file = self.segments_per_file.clamp(1, 1_000);
        self.snr_db = self.snr_db.clamp(-60.0, 120.0);
        self.gate_factor = self.gate_factor.clamp(0.0, 100.0);
        self.denoise_fft_size = self.denoise_fft_size.clamp(64, 1 << 16).next_power_of_two();
        self.denoise_hop = self.denoise_hop.clamp(1, self.denoise_fft_size);
        self.index_fft_size = self.index_fft_size.clamp(64, 1 << 16).next_power_of_two();
        self.index_overlap = self.index_overlap.min(self.index_fft_size - 1);
        self.file_timeout_secs = self.file_timeout_secs.max(1);
    }
}
